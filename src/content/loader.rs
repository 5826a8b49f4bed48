use crate::content::ContentRegistry;
use crate::content::builder::BuildReport;
use crate::models::blueprint::{
    AreaManifest, ItemBlueprint, Metatype, MobBlueprint, Pregen, Quality, RoomBlueprint, Skill, SkillGroup,
};
use crate::models::types::room_key;
use rand::Rng;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What `load_all` found. Files that failed to read or parse are listed in `skipped`.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub metatypes: usize,
    pub pregens: usize,
    pub qualities: usize,
    pub skills: usize,
    pub skill_groups: usize,
    pub areas: usize,
    pub rooms: usize,
    pub items: usize,
    pub mobs: usize,
    pub skipped: Vec<(PathBuf, String)>,
    pub build: BuildReport,
}

impl std::fmt::Display for LoadReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} metatypes, {} pregens, {} qualities, {} skills, {} skill groups, {} areas, {} rooms, {} items, {} mobs ({} files skipped)",
            self.metatypes,
            self.pregens,
            self.qualities,
            self.skills,
            self.skill_groups,
            self.areas,
            self.rooms,
            self.items,
            self.mobs,
            self.skipped.len()
        )
    }
}

/// All `.yaml`/`.yml` files directly inside `dir`, sorted. A missing directory is empty.
fn list_yaml_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "content directory not present");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for e in fs::read_dir(dir)? {
        let p = e?.path();
        if !p.is_file() {
            continue;
        }
        let name = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if name.ends_with(".yaml") || name.ends_with(".yml") {
            files.push(p);
        }
    }
    files.sort();
    Ok(files)
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_yaml::from_str(&text).map_err(|e| e.to_string())
}

/// Parse every file in `dir` as `T` and hand it to `f`. Bad files are logged and skipped.
fn load_dir<T: DeserializeOwned>(dir: &Path, report: &mut LoadReport, mut f: impl FnMut(T)) -> usize {
    let files = match list_yaml_files(dir) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "cannot list content directory");
            report.skipped.push((dir.to_path_buf(), e.to_string()));
            return 0;
        }
    };

    let mut loaded = 0;
    for path in files {
        match read_yaml::<T>(&path) {
            Ok(record) => {
                f(record);
                loaded += 1;
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "skipping content file");
                report.skipped.push((path, e));
            }
        }
    }
    loaded
}

impl ContentRegistry {
    /// One-time ordered load of everything under `base`, followed by `build_rooms`.
    ///
    /// Reference tables come first, then every area in directory order (manifest, rooms,
    /// items, mobs). Nothing in here aborts the load; problems are logged and reported.
    pub fn load_all(&self, base: &Path, rng: &mut impl Rng) -> LoadReport {
        let mut report = LoadReport::default();

        let metatypes = load_dir(&base.join("metatypes"), &mut report, |m: Metatype| {
            self.add_metatype(m.id.clone(), Arc::new(m));
        });
        let pregens = load_dir(&base.join("pregens"), &mut report, |p: Pregen| {
            self.add_pregen(p.id.clone(), Arc::new(p));
        });
        let qualities = load_dir(&base.join("qualities"), &mut report, |q: Quality| {
            self.add_quality(q.id.clone(), Arc::new(q));
        });
        let skills = load_dir(&base.join("skills"), &mut report, |s: Skill| {
            self.add_skill(s.id.clone(), Arc::new(s));
        });
        let skill_groups = load_dir(&base.join("skill_groups"), &mut report, |g: SkillGroup| {
            self.add_skill_group(g.id.clone(), Arc::new(g));
        });

        report.metatypes = metatypes;
        report.pregens = pregens;
        report.qualities = qualities;
        report.skills = skills;
        report.skill_groups = skill_groups;

        for area_dir in self.area_dirs(&base.join("areas"), &mut report) {
            self.load_area(&area_dir, &mut report);
        }

        report.build = self.build_rooms(rng);
        tracing::info!(%report, "content loaded");
        report
    }

    fn area_dirs(&self, dir: &Path, report: &mut LoadReport) -> Vec<PathBuf> {
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "no areas directory");
            return Vec::new();
        }
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                report.skipped.push((dir.to_path_buf(), e.to_string()));
                return Vec::new();
            }
        };

        let mut dirs: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).filter(|p| p.is_dir()).collect();
        dirs.sort();
        dirs
    }

    fn load_area(&self, dir: &Path, report: &mut LoadReport) {
        let Some(area) = dir.file_name().and_then(|s| s.to_str()).map(str::to_string) else {
            return;
        };

        let manifest_path = dir.join("manifest.yaml");
        match read_yaml::<AreaManifest>(&manifest_path) {
            Ok(manifest) => {
                if manifest.id != area {
                    tracing::warn!(area = %area, manifest = %manifest.id, "manifest id differs from directory, using directory");
                }
                self.add_area(area.clone(), Arc::new(manifest));
                report.areas += 1;
            }
            Err(e) => {
                tracing::warn!(area = %area, error = %e, "skipping area without a readable manifest");
                report.skipped.push((manifest_path, e));
                return;
            }
        }

        let rooms = load_dir(&dir.join("rooms"), report, |r: RoomBlueprint| {
            self.add_room_blueprint(room_key(&area, &r.id), Arc::new(r));
        });
        let items = load_dir(&dir.join("items"), report, |i: ItemBlueprint| {
            if let Some(prev) = self.add_item_blueprint(i.id.clone(), Arc::new(i)) {
                tracing::warn!(item = %prev.id, area = %area, "duplicate item blueprint id, later one wins");
            }
        });
        let mobs = load_dir(&dir.join("mobs"), report, |m: MobBlueprint| {
            if let Some(prev) = self.add_mob_blueprint(m.id.clone(), Arc::new(m)) {
                tracing::warn!(mob = %prev.id, area = %area, "duplicate mob blueprint id, later one wins");
            }
        });

        report.rooms += rooms;
        report.items += items;
        report.mobs += mobs;
    }
}
