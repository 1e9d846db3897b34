// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end E2K export scenarios.

use structlink_e2k::{E2kExporter, E2kOptions};
use structlink_model::CanonicalModel;
use structlink_topology::{AreaKind, ExactStoryResolver, LineKind};

const TWO_BAY: &str = r#"{
    "project": { "name": "Two bay", "units": { "length": "foot", "force": "kip" } },
    "layout": {
        "levels": [
            { "id": "L1", "name": "Level 1", "elevation": 12.0 },
            { "id": "L2", "name": "Level 2", "elevation": 24.0 },
            { "id": "LX", "name": "Mezzanine", "elevation": 18.0 }
        ]
    },
    "properties": {
        "frame_properties": [
            { "id": "FP1", "name": "W14X90" },
            { "id": "FP2", "name": "W18X35" }
        ],
        "floor_properties": [{ "id": "S1", "name": "Slab6" }],
        "wall_properties": [{ "id": "WP1", "name": "Wall12" }]
    },
    "elements": {
        "columns": [
            { "id": "c1", "start_point": {"x": 0.0, "y": 0.0}, "end_point": {"x": 0.0, "y": 0.0},
              "level_id": "L1", "frame_property_id": "FP1" },
            { "id": "c2", "start_point": {"x": 10.0, "y": 0.0}, "end_point": {"x": 10.0, "y": 0.0},
              "level_id": "L1", "frame_property_id": "FP1" }
        ],
        "beams": [
            { "id": "b1", "start_point": {"x": 0.05, "y": -0.05}, "end_point": {"x": 10.1, "y": 0.0},
              "level_id": "L1", "frame_property_id": "FP2" },
            { "id": "b2", "start_point": {"x": 0.0, "y": 0.0}, "end_point": null,
              "level_id": "L1", "frame_property_id": "FP2" },
            { "id": "b3", "start_point": {"x": 0.0, "y": 10.0}, "end_point": {"x": 10.0, "y": 10.0},
              "level_id": "LX", "frame_property_id": "FP2" }
        ],
        "floors": [
            { "id": "f1", "points": [{"x": 0.1, "y": -0.1}, {"x": 10.1, "y": 0.1},
                {"x": 9.9, "y": 9.9}, {"x": -0.1, "y": 10.1}],
              "level_id": "L1", "property_id": "S1" },
            { "id": "f2", "points": [{"x": 9.9, "y": -0.1}, {"x": 20.1, "y": 0.0},
                {"x": 19.9, "y": 10.1}, {"x": 10.1, "y": 10.1}],
              "level_id": "L1", "property_id": "S1" },
            { "id": "f3", "points": [{"x": 20.0, "y": 10.0}, {"x": 10.0, "y": 10.0},
                {"x": 10.0, "y": 0.0}, {"x": 20.0, "y": 0.0}],
              "level_id": "L2", "property_id": "S1" }
        ],
        "walls": [
            { "id": "w1", "points": [{"x": 0.0, "y": 0.01}, {"x": 10.0, "y": 0.0},
                {"x": 10.0, "y": 0.5}, {"x": 0.0, "y": 0.5}],
              "level_id": "L1", "property_id": "WP1" },
            { "id": "w2", "points": [{"x": 0.0, "y": 0.0}, {"x": 0.0, "y": 10.0},
                {"x": 0.5, "y": 5.0}],
              "level_id": "L1", "property_id": "MISSING" }
        ],
        "openings": [
            { "id": "o1", "points": [{"x": 2.0, "y": 2.0}, {"x": 4.0, "y": 2.0},
                {"x": 4.0, "y": 4.0}], "floor_id": "f1" }
        ]
    },
    "loads": {
        "load_definitions": [
            { "id": "LD1", "name": "Dead", "load_type": "dead", "self_weight": 1.0 },
            { "id": "LD2", "name": "Live", "load_type": "live" },
            { "id": "LD3", "name": "EQX", "load_type": "seismic" }
        ],
        "load_combinations": [
            { "id": "C1", "name": "1.2D+1.6L", "factors": [
                { "load_definition_id": "LD1", "factor": 1.2 },
                { "load_definition_id": "LD2", "factor": 1.6 }
            ] }
        ]
    }
}"#;

fn model() -> CanonicalModel {
    CanonicalModel::from_json(TWO_BAY).unwrap()
}

fn options() -> E2kOptions {
    E2kOptions {
        story_prefix: "Story ".to_string(),
        ..Default::default()
    }
}

fn lines_starting<'a>(text: &'a str, prefix: &str) -> Vec<&'a str> {
    text.lines().filter(|l| l.starts_with(prefix)).collect()
}

#[test]
fn sections_appear_in_fixed_order() {
    let doc = E2kExporter::new(options()).export(&model()).unwrap();
    let markers: Vec<_> = lines_starting(&doc.text, "$ ");
    assert_eq!(
        markers,
        [
            "$ CONTROLS",
            "$ STORIES - IN SEQUENCE FROM TOP",
            "$ DIAPHRAGM NAMES",
            "$ POINT COORDINATES",
            "$ LINE CONNECTIVITIES",
            "$ AREA CONNECTIVITIES",
            "$ LINE ASSIGNS",
            "$ AREA ASSIGNS",
            "$ LOAD PATTERNS",
            "$ LOAD CASES",
            "$ LOAD COMBINATIONS",
        ]
    );
}

#[test]
fn stories_are_written_top_down_with_base() {
    let doc = E2kExporter::new(options()).export(&model()).unwrap();
    assert_eq!(
        lines_starting(&doc.text, "STORY "),
        [
            "STORY \"Story Level 2\" HEIGHT 6.00",
            "STORY \"Story Mezzanine\" HEIGHT 6.00",
            "STORY \"Story Level 1\" HEIGHT 12.00",
            "STORY \"Base\" ELEV 0.00",
        ]
    );
}

#[test]
fn shared_corners_become_one_point() {
    let doc = E2kExporter::new(options()).export(&model()).unwrap();
    let points = lines_starting(&doc.text, "POINT ");

    // Columns mint the first two points; everything drawn near them reuses them.
    assert_eq!(points[0], "POINT \"1\" 0.00 0.00");
    assert_eq!(points[1], "POINT \"2\" 10.00 0.00");
    assert_eq!(points.len(), doc.summary.points);
    assert_eq!(
        lines_starting(&doc.text, "LINE \"B1\""),
        ["LINE \"B1\" BEAM \"1\" \"2\" 0"]
    );
    assert_eq!(
        lines_starting(&doc.text, "LINE \"C2\""),
        ["LINE \"C2\" COLUMN \"2\" \"2\" 1"]
    );
}

#[test]
fn edge_sharing_floors_overlap_on_two_points() {
    let doc = E2kExporter::new(options()).export(&model()).unwrap();
    let area = |id: &str| -> Vec<String> {
        let line = lines_starting(&doc.text, &format!("AREA \"{id}\""))[0];
        line.split_whitespace()
            .filter(|t| t.starts_with('"'))
            .skip(1)
            .map(str::to_string)
            .collect()
    };
    let f1 = area("F1");
    let f2 = area("F2");
    assert_eq!(f1.len(), 4);
    let shared = f1.iter().filter(|p| f2.contains(p)).count();
    assert_eq!(shared, 2);
}

#[test]
fn permuted_floor_on_another_story_reuses_area() {
    let doc = E2kExporter::new(options()).export(&model()).unwrap();
    // f3 traces f2's corners in a different order.
    assert_eq!(lines_starting(&doc.text, "AREA \"F").len(), 2);
    let assigns = lines_starting(&doc.text, "AREAASSIGN \"F2\"");
    assert_eq!(
        assigns,
        [
            "AREAASSIGN \"F2\" \"Story Level 1\" SECTION \"Slab6\" DIAPH \"D1\"",
            "AREAASSIGN \"F2\" \"Story Level 2\" SECTION \"Slab6\" DIAPH \"D1\"",
        ]
    );
}

#[test]
fn opening_inherits_story_from_host_floor() {
    let doc = E2kExporter::new(options()).export(&model()).unwrap();
    assert!(doc.text.contains("AREA \"OP1\" FLOOR 3 "));
    assert!(doc
        .text
        .contains("AREAASSIGN \"OP1\" \"Story Level 1\" OPENING \"Yes\"\n"));
}

#[test]
fn wall_panels_span_down_from_their_base_edge() {
    let doc = E2kExporter::new(options()).export(&model()).unwrap();
    let wall = lines_starting(&doc.text, "AREA \"W1\" PANEL 4 ")[0];
    assert!(wall.ends_with(" 1 1 0 0"), "{wall}");
    let floor = lines_starting(&doc.text, "AREA \"F1\" FLOOR 4 ")[0];
    assert!(floor.ends_with(" 0 0 0 0"), "{floor}");
}

#[test]
fn skipped_elements_are_counted() {
    let doc = E2kExporter::new(options()).export(&model()).unwrap();
    let s = &doc.summary;

    let beams = s.tally(LineKind::Beam).unwrap();
    assert_eq!(beams.exported, 2);
    assert_eq!(beams.missing_mapping, 1);

    let walls = s.tally(AreaKind::Wall).unwrap();
    assert_eq!(walls.exported, 1);
    assert_eq!(walls.missing_property, 1);
    assert!(!doc.text.contains("MISSING"));

    assert_eq!(s.skipped(), 2);
    let report = s.to_string();
    assert!(report.contains("Beam: 2 exported, 1 skipped"));
}

#[test]
fn exact_resolver_skips_prefixed_stories() {
    let doc = E2kExporter::new(options())
        .with_resolver(ExactStoryResolver)
        .export(&model())
        .unwrap();
    assert!(lines_starting(&doc.text, "LINEASSIGN").is_empty());
    assert!(lines_starting(&doc.text, "AREAASSIGN").is_empty());
    assert!(!doc.text.contains("\"\" SECTION"));
    assert_eq!(doc.summary.tally(LineKind::Column).unwrap().missing_level, 2);
}

#[test]
fn unmatched_level_produces_no_blank_story() {
    let mut model = model();
    model.layout.levels[2].name = String::new();
    let doc = E2kExporter::new(options()).export(&model).unwrap();
    assert!(lines_starting(&doc.text, "LINEASSIGN \"B3\"").is_empty());
    assert_eq!(doc.summary.tally(LineKind::Beam).unwrap().missing_level, 1);
    assert!(!doc.text.contains("\"\" SECTION"));
}

#[test]
fn missing_seismic_pattern_is_added() {
    let doc = E2kExporter::new(options()).export(&model()).unwrap();
    assert_eq!(
        lines_starting(&doc.text, "LOADPATTERN"),
        [
            "LOADPATTERN \"Dead\" TYPE \"Dead\" SELFWEIGHT 1",
            "LOADPATTERN \"Live\" TYPE \"Live\" SELFWEIGHT 0",
            "LOADPATTERN \"EQX\" TYPE \"Seismic\" SELFWEIGHT 0",
            "LOADPATTERN \"EQY\" TYPE \"Seismic\" SELFWEIGHT 0",
        ]
    );
    assert_eq!(lines_starting(&doc.text, "LOADCASE").len(), 8);
    assert_eq!(doc.summary.load_combinations, 1);
}

#[test]
fn default_loads_when_none_defined() {
    let mut model = model();
    model.loads.load_definitions.clear();
    model.loads.load_combinations.clear();
    let doc = E2kExporter::new(options()).export(&model).unwrap();
    let names: Vec<_> = lines_starting(&doc.text, "LOADPATTERN")
        .iter()
        .map(|l| l.split('"').nth(1).unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, ["Dead", "Live", "Super Dead", "EQX", "EQY"]);
    assert!(doc
        .text
        .contains("LOADCASE \"Super Dead\" TYPE \"Linear Static\" INITCOND \"PRESET\"\n"));
}

#[test]
fn custom_text_is_appended_last() {
    let opts = E2kOptions {
        custom_text: Some("$ ANALYSIS OPTIONS\nACTIVEDOF \"UX UY UZ\"".to_string()),
        ..options()
    };
    let doc = E2kExporter::new(opts).export(&model()).unwrap();
    assert!(doc.text.ends_with("$ ANALYSIS OPTIONS\nACTIVEDOF \"UX UY UZ\"\n"));
}

#[test]
fn exports_are_independent() {
    let exporter = E2kExporter::new(options());
    let first = exporter.export(&model()).unwrap();
    let second = exporter.export(&model()).unwrap();
    assert_eq!(first.text, second.text);
    assert_eq!(first.summary, second.summary);
}

#[test]
fn no_diaphragm_omits_section_and_flag() {
    let opts = E2kOptions {
        diaphragm: None,
        ..options()
    };
    let doc = E2kExporter::new(opts).export(&model()).unwrap();
    assert!(!doc.text.contains("DIAPH"));
    assert!(!doc.text.contains("$ DIAPHRAGM NAMES"));
}
