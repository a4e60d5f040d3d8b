use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

/// Substring the inference service puts in its error message while a model is cold.
pub const LOADING_MARKER: &str = "loading";
pub const DEFAULT_LOADING_WAIT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

/// A detected object. Box coordinates are absolute pixels of the source image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub score: f64,
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Text classification output. Depending on the endpoint the scores come either as a
/// flat list or wrapped once more per input.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ClassificationOutput {
    Batched(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassificationOutput {
    pub fn into_scores(self) -> Vec<LabelScore> {
        match self {
            Self::Batched(batches) => batches.into_iter().next().unwrap_or_default(),
            Self::Flat(scores) => scores,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumIter,
)]
pub enum Sentiment {
    #[strum(serialize = "Sangat Negatif")]
    #[serde(rename = "Sangat Negatif")]
    VeryNegative,
    #[strum(serialize = "Negatif")]
    #[serde(rename = "Negatif")]
    Negative,
    #[strum(serialize = "Netral")]
    #[serde(rename = "Netral")]
    Neutral,
    #[strum(serialize = "Positif")]
    #[serde(rename = "Positif")]
    Positive,
    #[strum(serialize = "Sangat Positif")]
    #[serde(rename = "Sangat Positif")]
    VeryPositive,
}

impl Sentiment {
    pub const fn stars(&self) -> u8 {
        match self {
            Self::VeryNegative => 1,
            Self::Negative => 2,
            Self::Neutral => 3,
            Self::Positive => 4,
            Self::VeryPositive => 5,
        }
    }

    pub fn lookup(raw_label: &str) -> Option<Self> {
        Self::lookup_positional(raw_label, PositionalLabels::Binary)
    }

    pub fn lookup_positional(raw_label: &str, positional: PositionalLabels) -> Option<Self> {
        let label = raw_label.trim().to_ascii_lowercase();
        let sentiment = match label.as_str() {
            "1 star" | "1 stars" => Self::VeryNegative,
            "2 star" | "2 stars" => Self::Negative,
            "3 star" | "3 stars" => Self::Neutral,
            "4 star" | "4 stars" => Self::Positive,
            "5 star" | "5 stars" => Self::VeryPositive,
            "negative" => Self::Negative,
            "neutral" => Self::Neutral,
            "positive" => Self::Positive,
            "label_0" => Self::Negative,
            "label_1" => match positional {
                PositionalLabels::Binary => Self::Positive,
                PositionalLabels::ThreeClass => Self::Neutral,
            },
            "label_2" => Self::Positive,
            _ => return None,
        };
        Some(sentiment)
    }

    /// Same as [`Sentiment::lookup`], but unknown labels are treated as neutral.
    pub fn from_label(raw_label: &str) -> Self {
        Self::lookup(raw_label).unwrap_or(Self::Neutral)
    }

    pub fn from_positional_label(raw_label: &str, positional: PositionalLabels) -> Self {
        Self::lookup_positional(raw_label, positional).unwrap_or(Self::Neutral)
    }
}

/// Reading of `LABEL_<n>` outputs, which only carry the class index.
///
/// Two-class heads are negative/positive. Once `LABEL_2` shows up the head is
/// negative/neutral/positive and `LABEL_1` becomes the neutral class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PositionalLabels {
    #[default]
    Binary,
    ThreeClass,
}

impl PositionalLabels {
    pub fn detect<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let three_class = labels
            .into_iter()
            .any(|label| label.trim().eq_ignore_ascii_case("label_2"));
        if three_class {
            Self::ThreeClass
        } else {
            Self::Binary
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSentiment {
    pub label: String,
    pub sentiment: Sentiment,
    pub score: f64,
}

impl ScoredSentiment {
    pub fn new(value: LabelScore, positional: PositionalLabels) -> Self {
        Self {
            sentiment: Sentiment::from_positional_label(&value.label, positional),
            label: value.label,
            score: value.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentResult {
    pub label: String,
    pub sentiment: Sentiment,
    pub score: f64,
    pub all_scores: Vec<ScoredSentiment>,
}

impl SentimentResult {
    pub fn stars(&self) -> u8 {
        self.sentiment.stars()
    }

    /// Picks the highest score as the primary result, the first one on ties.
    /// Returns `None` when the model produced no scores at all.
    pub fn from_scores(scores: Vec<LabelScore>) -> Option<Self> {
        let top = scores.iter().fold(None::<&LabelScore>, |best, current| match best {
            Some(best) if best.score >= current.score => Some(best),
            _ => Some(current),
        })?;
        let positional = PositionalLabels::detect(scores.iter().map(|s| s.label.as_str()));

        Some(Self {
            label: top.label.clone(),
            sentiment: Sentiment::from_positional_label(&top.label, positional),
            score: top.score,
            all_scores: scores
                .into_iter()
                .map(|score| ScoredSentiment::new(score, positional))
                .collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamFailure {
    Loading { message: String, retry_after: Duration },
    Terminal { message: String },
}

impl UpstreamFailure {
    /// Sorts an inference service error into cold start or terminal failure.
    pub fn classify(message: impl Into<String>, estimated_time: Option<f64>) -> Self {
        let message = message.into();
        if !message.to_ascii_lowercase().contains(LOADING_MARKER) {
            return Self::Terminal { message };
        }

        let retry_after = estimated_time
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(|secs| Duration::from_secs(secs.ceil() as u64))
            .unwrap_or(DEFAULT_LOADING_WAIT);
        Self::Loading {
            message,
            retry_after,
        }
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}
