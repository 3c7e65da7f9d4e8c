use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const FALLBACK_FAMILY: &str = "sans-serif";

/// A font file to probe for and the family name it registers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontCandidate {
    pub path: PathBuf,
    pub family: String,
}

impl FontCandidate {
    pub fn new<P: Into<PathBuf>, F: Into<String>>(path: P, family: F) -> Self {
        Self {
            path: path.into(),
            family: family.into(),
        }
    }
}

/// Display font chosen for task labels, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontChoice {
    pub family: String,
    pub path: Option<PathBuf>,
}

impl FontChoice {
    pub fn fallback() -> Self {
        Self {
            family: FALLBACK_FAMILY.to_string(),
            path: None,
        }
    }

    /// CSS `font-family` list: the chosen family, then the generic fallback.
    pub fn css_family(&self) -> String {
        if self.family == FALLBACK_FAMILY {
            FALLBACK_FAMILY.to_string()
        } else {
            format!("'{}', {}", self.family.replace('\'', ""), FALLBACK_FAMILY)
        }
    }
}

impl Default for FontChoice {
    fn default() -> Self {
        Self::fallback()
    }
}

/// CJK-capable fonts commonly installed by Linux distributions.
pub fn default_candidates() -> Vec<FontCandidate> {
    vec![
        FontCandidate::new(
            "/usr/share/fonts/opentype/ipafont-gothic/ipagp.ttf",
            "IPAPGothic",
        ),
        FontCandidate::new(
            "/usr/share/fonts/truetype/takao-gothic/TakaoPGothic.ttf",
            "TakaoPGothic",
        ),
        FontCandidate::new(
            "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
            "Noto Sans CJK JP",
        ),
    ]
}

pub fn resolve_font(candidates: &[FontCandidate]) -> FontChoice {
    resolve_font_with(candidates, Path::exists)
}

fn resolve_font_with(candidates: &[FontCandidate], exists: impl Fn(&Path) -> bool) -> FontChoice {
    for candidate in candidates {
        if exists(&candidate.path) {
            log::debug!(
                "using font {} from {}",
                candidate.family,
                candidate.path.display()
            );
            return FontChoice {
                family: candidate.family.clone(),
                path: Some(candidate.path.clone()),
            };
        }
    }

    log::debug!("no candidate font found, falling back to {FALLBACK_FAMILY}");
    FontChoice::fallback()
}
