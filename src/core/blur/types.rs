//! Blur scoring result types.

use serde::{Deserialize, Serialize};

/// Scores strictly below this are labelled [`BlurQuality::Sharp`]
pub const SHARP_SCORE_LIMIT: f64 = 0.3;

/// Scores strictly below this (and not sharp) are [`BlurQuality::Moderate`]
pub const MODERATE_SCORE_LIMIT: f64 = 0.6;

/// Three-tier quality label derived from a blur score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlurQuality {
    Sharp,
    Moderate,
    Blurry,
}

impl BlurQuality {
    /// Label a score: `< sharp_below` is sharp, `< moderate_below` is
    /// moderate, anything else is blurry.
    pub fn classify(score: f64, sharp_below: f64, moderate_below: f64) -> Self {
        if score < sharp_below {
            BlurQuality::Sharp
        } else if score < moderate_below {
            BlurQuality::Moderate
        } else {
            BlurQuality::Blurry
        }
    }

    /// Wire tag used by channel callers
    pub fn as_str(&self) -> &'static str {
        match self {
            BlurQuality::Sharp => "sharp",
            BlurQuality::Moderate => "moderate",
            BlurQuality::Blurry => "blurry",
        }
    }
}

impl std::fmt::Display for BlurQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of scoring one image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlurResult {
    /// 0.0 = sharp, 1.0 = blurred
    pub score: f64,
    pub quality: BlurQuality,
    /// Mean squared Laplacian response the score was mapped from
    pub mean_variance: f64,
    /// Sampling stride used for this image
    pub step: usize,
}

impl BlurResult {
    pub fn is_blurry(&self) -> bool {
        self.quality == BlurQuality::Blurry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_exact() {
        let label = |score| BlurQuality::classify(score, SHARP_SCORE_LIMIT, MODERATE_SCORE_LIMIT);

        assert_eq!(label(0.0), BlurQuality::Sharp);
        assert_eq!(label(0.299_999), BlurQuality::Sharp);
        assert_eq!(label(0.3), BlurQuality::Moderate);
        assert_eq!(label(0.599_999), BlurQuality::Moderate);
        assert_eq!(label(0.6), BlurQuality::Blurry);
        assert_eq!(label(1.0), BlurQuality::Blurry);
    }

    #[test]
    fn custom_cut_offs() {
        assert_eq!(BlurQuality::classify(0.45, 0.5, 0.8), BlurQuality::Sharp);
        assert_eq!(BlurQuality::classify(0.5, 0.5, 0.8), BlurQuality::Moderate);
    }

    #[test]
    fn quality_display_and_serde_agree() {
        for quality in [BlurQuality::Sharp, BlurQuality::Moderate, BlurQuality::Blurry] {
            let json = serde_json::to_string(&quality).unwrap();
            assert_eq!(json, format!("\"{}\"", quality));
        }
    }
}
