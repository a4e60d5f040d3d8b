use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

/// Arcade points per earned badge. Depends on the running season.
pub const DEFAULT_POINTS_PER_BADGE: f64 = 0.5;
pub const NO_ACTIVITY: &str = "-";

static BADGE: LazyLock<Selector> = LazyLock::new(|| selector(".profile-badge"));
static IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static EARNED_DATE: LazyLock<Selector> = LazyLock::new(|| selector(".ql-body-medium.l-mbs"));
static MODAL_BUTTON: LazyLock<Selector> = LazyLock::new(|| selector("ql-button[modal]"));
static WITH_ID: LazyLock<Selector> = LazyLock::new(|| selector("[id]"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector(".profile-badge--title"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub title: String,
    pub date: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArcadeStats {
    pub total_badges: u32,
    pub estimated_points: u32,
    pub last_active: String,
    pub profile_url: String,
}

impl ArcadeStats {
    pub fn from_badges(badges: &[Badge], points_per_badge: f64, profile_url: String) -> Self {
        let total_badges = badges.len() as u32;
        Self {
            total_badges,
            estimated_points: (total_badges as f64 * points_per_badge).floor() as u32,
            last_active: badges
                .first()
                .map(|badge| badge.date.clone())
                .unwrap_or_else(|| NO_ACTIVITY.to_string()),
            profile_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArcadeProfile {
    pub stats: ArcadeStats,
    pub badges: Vec<Badge>,
}

impl ArcadeProfile {
    pub fn parse(html: &str, profile_url: String, points_per_badge: f64) -> Self {
        let badges = parse_badges(html);
        Self {
            stats: ArcadeStats::from_badges(&badges, points_per_badge, profile_url),
            badges,
        }
    }
}

/// Extracts every badge of a public profile page, in document order.
///
/// Badges without a resolvable title or image are skipped.
pub fn parse_badges(html: &str) -> Vec<Badge> {
    let document = Html::parse_document(html);
    document
        .select(&BADGE)
        .filter_map(|element| parse_badge(&document, element))
        .collect()
}

fn parse_badge(document: &Html, element: ElementRef<'_>) -> Option<Badge> {
    let image = element
        .select(&IMAGE)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())?;

    let date_text: String = element.select(&EARNED_DATE).flat_map(|e| e.text()).collect();
    let date = date_text.replacen("Earned", "", 1).trim().to_string();

    let title = modal_headline(document, element)
        .or_else(|| {
            let text: String = element.select(&TITLE).flat_map(|e| e.text()).collect();
            Some(text.trim().to_string())
        })
        .filter(|title| !title.is_empty())?;

    Some(Badge {
        title,
        date,
        image: image.to_string(),
    })
}

// The title lives on the dialog referenced by the badge's button, not on the badge itself.
fn modal_headline(document: &Html, element: ElementRef<'_>) -> Option<String> {
    let modal_id = element
        .select(&MODAL_BUTTON)
        .next()?
        .value()
        .attr("modal")?;

    document
        .select(&WITH_ID)
        .find(|candidate| candidate.value().id() == Some(modal_id))?
        .value()
        .attr("headline")
        .map(|headline| headline.trim().to_string())
        .filter(|headline| !headline.is_empty())
}
