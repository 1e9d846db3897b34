// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process [`RamModel`] and [`RamDatabase`].

use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};
use structlink_model::{MaterialKind, Point2D};
use structlink_topology::{AreaKind, LineKind};

use crate::api::{
    RamDatabase, RamFloorType, RamLoadValues, RamMaterial, RamModel, RamSection, RamStory, RamUid,
};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct RamMember {
    pub uid: RamUid,
    pub floor_type: RamUid,
    pub kind: LineKind,
    pub section: RamUid,
    pub start: Point2D,
    pub end: Point2D,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RamArea {
    pub uid: RamUid,
    pub floor_type: RamUid,
    pub kind: AreaKind,
    pub property: Option<String>,
    pub points: Vec<Point2D>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RamSurfaceLoadSet {
    pub uid: RamUid,
    pub name: String,
    pub values: RamLoadValues,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RamSurfaceLoad {
    pub uid: RamUid,
    pub floor_type: RamUid,
    pub load_set: RamUid,
    pub points: Vec<Point2D>,
}

/// A RAM model held in memory. UIDs start at 1 and are shared by every
/// object kind.
#[derive(Debug, Clone, Default)]
pub struct MemoryRamModel {
    materials: Vec<RamMaterial>,
    sections: Vec<RamSection>,
    floor_types: Vec<RamFloorType>,
    stories: Vec<RamStory>,
    members: Vec<RamMember>,
    areas: Vec<RamArea>,
    load_sets: Vec<RamSurfaceLoadSet>,
    surface_loads: Vec<RamSurfaceLoad>,
    last_uid: i64,
    rejected_floor_types: FxHashSet<RamUid>,
}

impl MemoryRamModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every layout call on `floor_type` fail with a native error.
    pub fn reject_layout_on(&mut self, floor_type: RamUid) {
        self.rejected_floor_types.insert(floor_type);
    }

    pub fn members(&self) -> &[RamMember] {
        &self.members
    }

    pub fn areas(&self) -> &[RamArea] {
        &self.areas
    }

    pub fn load_sets(&self) -> &[RamSurfaceLoadSet] {
        &self.load_sets
    }

    pub fn surface_loads(&self) -> &[RamSurfaceLoad] {
        &self.surface_loads
    }

    fn next_uid(&mut self) -> RamUid {
        self.last_uid += 1;
        RamUid(self.last_uid)
    }

    fn check_name(kind: &str, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::Native(format!("{kind} name is empty")));
        }
        Ok(())
    }

    fn check_layout_target(&self, floor_type: RamUid) -> Result<()> {
        if !self.floor_types.iter().any(|f| f.uid == floor_type) {
            return Err(Error::Native(format!("unknown floor type {floor_type}")));
        }
        if self.rejected_floor_types.contains(&floor_type) {
            return Err(Error::Native(format!(
                "floor type {floor_type} rejected the object"
            )));
        }
        Ok(())
    }

    fn check_polygon(points: &[Point2D]) -> Result<()> {
        if points.len() < 3 {
            return Err(Error::Native(format!(
                "polygon needs 3 points, got {}",
                points.len()
            )));
        }
        Ok(())
    }
}

impl RamModel for MemoryRamModel {
    fn material_count(&self) -> usize {
        self.materials.len()
    }

    fn material(&self, index: usize) -> Option<RamMaterial> {
        self.materials.get(index).cloned()
    }

    fn add_material(&mut self, name: &str, kind: MaterialKind) -> Result<RamUid> {
        Self::check_name("material", name)?;
        let uid = self.next_uid();
        self.materials.push(RamMaterial {
            uid,
            name: name.to_string(),
            kind,
        });
        Ok(uid)
    }

    fn section_count(&self) -> usize {
        self.sections.len()
    }

    fn section(&self, index: usize) -> Option<RamSection> {
        self.sections.get(index).cloned()
    }

    fn add_section(&mut self, name: &str, material: Option<RamUid>) -> Result<RamUid> {
        Self::check_name("section", name)?;
        if let Some(material) = material {
            if !self.materials.iter().any(|m| m.uid == material) {
                return Err(Error::Native(format!("unknown material {material}")));
            }
        }
        let uid = self.next_uid();
        self.sections.push(RamSection {
            uid,
            name: name.to_string(),
            material,
        });
        Ok(uid)
    }

    fn floor_type_count(&self) -> usize {
        self.floor_types.len()
    }

    fn floor_type(&self, index: usize) -> Option<RamFloorType> {
        self.floor_types.get(index).cloned()
    }

    fn add_floor_type(&mut self, name: &str) -> Result<RamUid> {
        Self::check_name("floor type", name)?;
        let uid = self.next_uid();
        self.floor_types.push(RamFloorType {
            uid,
            name: name.to_string(),
        });
        Ok(uid)
    }

    fn story_count(&self) -> usize {
        self.stories.len()
    }

    fn story(&self, index: usize) -> Option<RamStory> {
        self.stories.get(index).cloned()
    }

    fn add_story(&mut self, name: &str, floor_type: RamUid, elevation: f64) -> Result<RamUid> {
        Self::check_name("story", name)?;
        if !self.floor_types.iter().any(|f| f.uid == floor_type) {
            return Err(Error::Native(format!("unknown floor type {floor_type}")));
        }
        if !(elevation.is_finite() && elevation > 0.0) {
            return Err(Error::Native(format!(
                "story elevation {elevation} is not above the base"
            )));
        }
        if self.stories.iter().any(|s| s.elevation == elevation) {
            return Err(Error::Native(format!(
                "a story already sits at elevation {elevation}"
            )));
        }
        let pos = self.stories.partition_point(|s| s.elevation < elevation);
        let below = pos
            .checked_sub(1)
            .map_or(0.0, |i| self.stories[i].elevation);
        let uid = self.next_uid();
        self.stories.insert(
            pos,
            RamStory {
                uid,
                name: name.to_string(),
                floor_type,
                elevation,
                height: elevation - below,
            },
        );
        if let Some(above) = self.stories.get_mut(pos + 1) {
            above.height = above.elevation - elevation;
        }
        Ok(uid)
    }

    fn add_member(
        &mut self,
        floor_type: RamUid,
        kind: LineKind,
        section: RamUid,
        start: Point2D,
        end: Point2D,
    ) -> Result<RamUid> {
        self.check_layout_target(floor_type)?;
        if !self.sections.iter().any(|s| s.uid == section) {
            return Err(Error::Native(format!("unknown section {section}")));
        }
        let uid = self.next_uid();
        self.members.push(RamMember {
            uid,
            floor_type,
            kind,
            section,
            start,
            end,
        });
        Ok(uid)
    }

    fn add_area(
        &mut self,
        floor_type: RamUid,
        kind: AreaKind,
        property: Option<&str>,
        points: &[Point2D],
    ) -> Result<RamUid> {
        self.check_layout_target(floor_type)?;
        Self::check_polygon(points)?;
        let uid = self.next_uid();
        self.areas.push(RamArea {
            uid,
            floor_type,
            kind,
            property: property.map(str::to_string),
            points: points.to_vec(),
        });
        Ok(uid)
    }

    fn add_surface_load_set(&mut self, name: &str, values: RamLoadValues) -> Result<RamUid> {
        Self::check_name("surface load set", name)?;
        let uid = self.next_uid();
        self.load_sets.push(RamSurfaceLoadSet {
            uid,
            name: name.to_string(),
            values,
        });
        Ok(uid)
    }

    fn add_surface_load(
        &mut self,
        floor_type: RamUid,
        load_set: RamUid,
        points: &[Point2D],
    ) -> Result<RamUid> {
        self.check_layout_target(floor_type)?;
        Self::check_polygon(points)?;
        if !self.load_sets.iter().any(|s| s.uid == load_set) {
            return Err(Error::Native(format!("unknown load set {load_set}")));
        }
        let uid = self.next_uid();
        self.surface_loads.push(RamSurfaceLoad {
            uid,
            floor_type,
            load_set,
            points: points.to_vec(),
        });
        Ok(uid)
    }
}

/// Database files kept in a map keyed by path.
#[derive(Debug, Default)]
pub struct MemoryRamDatabase {
    files: FxHashMap<PathBuf, MemoryRamModel>,
    current: Option<(PathBuf, MemoryRamModel)>,
    fail_save: bool,
}

impl MemoryRamDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `model` as the saved content of `path`.
    pub fn insert_file(&mut self, path: impl Into<PathBuf>, model: MemoryRamModel) {
        self.files.insert(path.into(), model);
    }

    /// The last saved content of `path`.
    pub fn file(&self, path: &Path) -> Option<&MemoryRamModel> {
        self.files.get(path)
    }

    /// Makes every subsequent `save` fail.
    pub fn fail_saves(&mut self) {
        self.fail_save = true;
    }
}

impl RamDatabase for MemoryRamDatabase {
    fn create(&mut self, path: &Path) -> Result<()> {
        if self.current.is_some() {
            return Err(Error::Create {
                path: path.to_path_buf(),
                reason: "another database is open".to_string(),
            });
        }
        self.current = Some((path.to_path_buf(), MemoryRamModel::new()));
        Ok(())
    }

    fn open(&mut self, path: &Path) -> Result<()> {
        if self.current.is_some() {
            return Err(Error::Open {
                path: path.to_path_buf(),
                reason: "another database is open".to_string(),
            });
        }
        let model = self.files.get(path).cloned().ok_or_else(|| Error::Open {
            path: path.to_path_buf(),
            reason: "no such database".to_string(),
        })?;
        self.current = Some((path.to_path_buf(), model));
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.current.is_some()
    }

    fn model(&self) -> Option<&dyn RamModel> {
        self.current.as_ref().map(|(_, m)| m as &dyn RamModel)
    }

    fn model_mut(&mut self) -> Option<&mut dyn RamModel> {
        self.current.as_mut().map(|(_, m)| m as &mut dyn RamModel)
    }

    fn save(&mut self) -> Result<()> {
        if self.fail_save {
            return Err(Error::Save("disk full".to_string()));
        }
        let (path, model) = self
            .current
            .as_ref()
            .ok_or_else(|| Error::Save("no database is open".to_string()))?;
        self.files.insert(path.clone(), model.clone());
        Ok(())
    }

    fn close(&mut self) {
        self.current = None;
    }
}
