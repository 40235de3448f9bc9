//! Animation catalog: text-art frames grouped into named animations and
//! categories.
//!
//! A sprites directory is laid out as `<category>/<animation>/<frame>.txt`,
//! or `<category>/<frame>.txt` for a category holding a single animation.
//! Spaces in a frame are transparent.

use crate::config::AnimationSettings;
use crate::rng::Rng;
use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum CatalogError {
    #[error("sprites directory not found: {0}")]
    MissingRoot(PathBuf),
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> CatalogError + '_ {
    move |source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// One frame as a grid of characters; `' '` is transparent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Frame {
    pub(crate) rows: Vec<Vec<char>>,
    pub(crate) w: usize,
}

impl Frame {
    pub(crate) fn parse(text: &str) -> Option<Self> {
        let mut rows: Vec<Vec<char>> = text
            .lines()
            .map(|l| l.trim_end().chars().collect())
            .collect();
        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }
        let w = rows.iter().map(Vec::len).max().unwrap_or(0);
        if w == 0 {
            return None;
        }
        Some(Self { rows, w })
    }

    pub(crate) fn h(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn at(&self, x: usize, y: usize) -> char {
        self.rows
            .get(y)
            .and_then(|r| r.get(x))
            .copied()
            .unwrap_or(' ')
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Animation {
    pub(crate) frames: Vec<Frame>,
    pub(crate) frame_rate_ms: u64,
    pub(crate) looping: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AnimationInfo {
    pub(crate) name: String,
    pub(crate) frame_count: usize,
    pub(crate) frame_rate_ms: u64,
    pub(crate) loops: bool,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Catalog {
    animations: HashMap<String, Animation>,
    categories: BTreeMap<String, Vec<String>>,
}

/// Filename patterns inside the `gun` directory, tried in order.
const GUN_PATTERNS: [&str; 4] = [
    "clover_geno_unsummon",
    "clover_geno_summon",
    "heart_yellow_shot",
    "shot_strong",
];

pub(crate) fn normalize_category(raw: &str) -> String {
    raw.to_lowercase()
        .replace([' ', '-'], "_")
        .replace('!', "")
}

pub(crate) fn frame_rate_for(name: &str, rates: &AnimationSettings) -> u64 {
    if name.contains("walking") || name.contains("run") {
        rates.walking_frame_rate
    } else if name.contains("dancing") {
        rates.dancing_frame_rate
    } else if name.contains("sitting") {
        rates.sitting_frame_rate
    } else if name.contains("meme") {
        rates.meme_frame_rate
    } else if name.contains("lying") {
        rates.lying_frame_rate
    } else if name.contains("nod") {
        rates.nod_frame_rate
    } else {
        rates.default_frame_rate
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Chunk {
    Num(u64),
    Text(String),
}

fn natural_key(s: &str) -> Vec<Chunk> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut in_digits = false;
    for ch in s.chars() {
        let d = ch.is_ascii_digit();
        if !buf.is_empty() && d != in_digits {
            out.push(flush_chunk(&mut buf, in_digits));
        }
        in_digits = d;
        buf.push(ch);
    }
    if !buf.is_empty() {
        out.push(flush_chunk(&mut buf, in_digits));
    }
    out
}

fn flush_chunk(buf: &mut String, digits: bool) -> Chunk {
    let s = std::mem::take(buf);
    if digits {
        match s.parse() {
            Ok(n) => Chunk::Num(n),
            Err(_) => Chunk::Text(s),
        }
    } else {
        Chunk::Text(s)
    }
}

pub(crate) fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b))
}

fn file_name(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn list_dir(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>), CatalogError> {
    let mut dirs = Vec::new();
    let mut frames = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err(dir))? {
        let path = entry.map_err(io_err(dir))?.path();
        if path.is_dir() {
            dirs.push(path);
        } else if path.extension().is_some_and(|e| e == "txt") {
            frames.push(path);
        }
    }
    dirs.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
    frames.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
    Ok((dirs, frames))
}

fn read_frames(files: &[PathBuf]) -> Result<Vec<Frame>, CatalogError> {
    let mut frames = Vec::with_capacity(files.len());
    for f in files {
        let text = fs::read_to_string(f).map_err(io_err(f))?;
        match Frame::parse(&text) {
            Some(frame) => frames.push(frame),
            None => tracing::debug!(path = %f.display(), "skipping empty frame"),
        }
    }
    Ok(frames)
}

impl Catalog {
    /// Walks a sprites directory.
    pub(crate) fn load_dir(root: &Path, rates: &AnimationSettings) -> Result<Self, CatalogError> {
        if !root.is_dir() {
            return Err(CatalogError::MissingRoot(root.to_path_buf()));
        }
        let mut cat = Catalog::default();
        let (category_dirs, _) = list_dir(root)?;

        for category_path in category_dirs {
            let category = normalize_category(&file_name(&category_path));
            cat.categories.entry(category.clone()).or_default();
            let (subdirs, files) = list_dir(&category_path)?;

            if !subdirs.is_empty() {
                for sub in &subdirs {
                    let name = format!("{category}_{}", file_name(sub));
                    let (_, sub_files) = list_dir(sub)?;
                    let frames = read_frames(&sub_files)?;
                    cat.insert(&category, name, frames, rates);
                }
                for f in &files {
                    let stem = f
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let frames = read_frames(std::slice::from_ref(f))?;
                    cat.insert(&category, stem, frames, rates);
                }
            } else if category == "gun" {
                for pattern in GUN_PATTERNS {
                    let group: Vec<PathBuf> = files
                        .iter()
                        .filter(|f| {
                            let n = file_name(f);
                            n.contains(pattern)
                                && GUN_PATTERNS
                                    .iter()
                                    .take_while(|p| **p != pattern)
                                    .all(|earlier| !n.contains(earlier))
                        })
                        .cloned()
                        .collect();
                    let frames = read_frames(&group)?;
                    cat.insert(&category, format!("gun_spr_{pattern}"), frames, rates);
                }
            } else {
                let frames = read_frames(&files)?;
                cat.insert(&category, category.clone(), frames, rates);
            }
        }

        tracing::info!(
            root = %root.display(),
            animations = cat.animations.len(),
            categories = cat.categories.len(),
            "sprites loaded"
        );
        Ok(cat)
    }

    fn insert(&mut self, category: &str, name: String, frames: Vec<Frame>, rates: &AnimationSettings) {
        if frames.is_empty() {
            return;
        }
        let frame_rate_ms = frame_rate_for(&name, rates);
        self.add(category, name, frames, frame_rate_ms);
    }

    pub(crate) fn add(&mut self, category: &str, name: String, frames: Vec<Frame>, frame_rate_ms: u64) {
        let names = self.categories.entry(category.to_string()).or_default();
        if !names.contains(&name) {
            names.push(name.clone());
        }
        self.animations.insert(
            name,
            Animation {
                frames,
                frame_rate_ms,
                looping: true,
            },
        );
    }

    /// Lays `other` over `self`: same-named animations are replaced.
    pub(crate) fn overlay(&mut self, other: Catalog) {
        for (category, names) in other.categories {
            let slot = self.categories.entry(category).or_default();
            for n in names {
                if !slot.contains(&n) {
                    slot.push(n);
                }
            }
        }
        self.animations.extend(other.animations);
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    pub(crate) fn exists(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }

    pub(crate) fn info(&self, name: &str) -> Option<AnimationInfo> {
        self.get(name).map(|a| AnimationInfo {
            name: name.to_string(),
            frame_count: a.frames.len(),
            frame_rate_ms: a.frame_rate_ms,
            loops: a.looping,
        })
    }

    pub(crate) fn by_category(&self, query: &str) -> &[String] {
        self.categories
            .get(&normalize_category(query))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn first_in(&self, category: &str) -> Option<&str> {
        self.by_category(category).first().map(String::as_str)
    }

    pub(crate) fn random_from_category(&self, category: &str, rng: &mut Rng) -> Option<&str> {
        rng.choose(self.by_category(category)).map(String::as_str)
    }

    pub(crate) fn all_names(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.animations.keys().map(String::as_str).collect();
        v.sort_unstable();
        v
    }

    pub(crate) fn all_categories(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    /// Total play time of one pass, `None` if the animation is unknown.
    pub(crate) fn duration_ms(&self, name: &str) -> Option<u64> {
        self.get(name)
            .map(|a| a.frames.len() as u64 * a.frame_rate_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, body: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn category_names_are_normalized() {
        assert_eq!(normalize_category("Characters Interactions!"), "characters_interactions");
        assert_eq!(normalize_category("edward-walking"), "edward_walking");
        assert_eq!(normalize_category("Dancing!"), "dancing");
    }

    #[test]
    fn natural_order() {
        let mut v = vec!["f10.txt", "f2.txt", "f1.txt"];
        v.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(v, ["f1.txt", "f2.txt", "f10.txt"]);
    }

    #[test]
    fn frame_rates_follow_the_name() {
        let r = AnimationSettings::default();
        assert_eq!(frame_rate_for("walking_spr_pl_up", &r), 120);
        assert_eq!(frame_rate_for("pl_run_left", &r), 120);
        assert_eq!(frame_rate_for("dancing", &r), 90);
        assert_eq!(frame_rate_for("sitting_spr_clover_sitting", &r), 200);
        assert_eq!(frame_rate_for("meme", &r), 150);
        assert_eq!(frame_rate_for("cart", &r), 150);
    }

    #[test]
    fn frame_parse_trims_trailing_blank_lines() {
        let f = Frame::parse(" o \n/|\\\n\n\n").unwrap();
        assert_eq!(f.h(), 2);
        assert_eq!(f.w, 3);
        assert_eq!(f.at(1, 0), 'o');
        assert_eq!(f.at(9, 9), ' ');
        assert!(Frame::parse("   \n\n").is_none());
    }

    #[test]
    fn loads_directory_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("Walking/spr_pl_up/10.txt"), "B");
        write(&root.join("Walking/spr_pl_up/2.txt"), "A");
        write(&root.join("Walking/solo.txt"), "S");
        write(&root.join("Dancing!/0.txt"), "D");
        fs::create_dir_all(root.join("empty")).unwrap();
        write(&root.join("gun/spr_clover_geno_unsummon_0.txt"), "U");
        write(&root.join("gun/spr_clover_geno_summon_0.txt"), "S0");
        write(&root.join("gun/spr_clover_geno_summon_1.txt"), "S1");
        write(&root.join("gun/spr_shot_strong_0.txt"), "X");
        write(&root.join("gun/other.txt"), "?");

        let cat = Catalog::load_dir(root, &AnimationSettings::default()).unwrap();

        let up = cat.get("walking_spr_pl_up").unwrap();
        assert_eq!(up.frames.len(), 2);
        assert_eq!(up.frames[0].at(0, 0), 'A');
        assert_eq!(up.frame_rate_ms, 120);
        assert!(cat.exists("solo"));
        assert_eq!(cat.by_category("walking"), ["walking_spr_pl_up", "solo"]);

        assert_eq!(cat.first_in("dancing!"), Some("dancing"));
        assert!(cat.by_category("empty").is_empty());
        assert!(!cat.exists("empty"));

        assert_eq!(cat.get("gun_spr_clover_geno_summon").unwrap().frames.len(), 2);
        assert_eq!(cat.get("gun_spr_clover_geno_unsummon").unwrap().frames.len(), 1);
        assert!(cat.exists("gun_spr_shot_strong"));
        assert!(!cat.exists("gun_spr_heart_yellow_shot"));
        assert_eq!(cat.by_category("gun").len(), 3);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load_dir(&dir.path().join("nope"), &AnimationSettings::default());
        assert!(matches!(err, Err(CatalogError::MissingRoot(_))));
    }

    #[test]
    fn overlay_replaces_and_extends() {
        let frame = Frame::parse("x").unwrap();
        let mut base = Catalog::default();
        base.add("cart", "cart".into(), vec![frame.clone()], 150);
        let mut top = Catalog::default();
        top.add("cart", "cart".into(), vec![frame.clone(), frame.clone()], 90);
        top.add("extra", "extra".into(), vec![frame], 150);
        base.overlay(top);

        assert_eq!(base.info("cart").unwrap().frame_count, 2);
        assert_eq!(base.by_category("cart"), ["cart"]);
        assert_eq!(base.all_categories(), ["cart", "extra"]);
        assert_eq!(base.duration_ms("cart"), Some(180));
        assert_eq!(base.duration_ms("nope"), None);
    }
}
