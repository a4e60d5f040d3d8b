use std::collections::HashMap;

use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub const TOP_LANGUAGES: usize = 5;
pub const DEFAULT_LANGUAGE_COLOR: &str = "#858585";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionDay {
    pub date: NaiveDate,
    #[serde(rename = "contributionCount")]
    pub count: u32,
}

impl ContributionDay {
    pub const fn new(date: NaiveDate, count: u32) -> Self {
        Self { date, count }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionWeek {
    #[serde(default)]
    pub contribution_days: Vec<ContributionDay>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar {
    #[serde(default)]
    pub total_contributions: u32,
    #[serde(default)]
    pub weeks: Vec<ContributionWeek>,
}

impl ContributionCalendar {
    /// Flattens the weekly grouping into one chronological sequence.
    pub fn days(&self) -> Vec<ContributionDay> {
        self.weeks
            .iter()
            .flat_map(|week| week.contribution_days.iter().copied())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    pub contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageNode {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageEdge {
    pub size: u64,
    pub node: LanguageNode,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguageConnection {
    #[serde(default)]
    pub edges: Vec<LanguageEdge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryNode {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub languages: Option<LanguageConnection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryConnection {
    // GraphQL connections may contain null nodes
    #[serde(default)]
    pub nodes: Vec<Option<RepositoryNode>>,
}

/// The `user` object of the contributions GraphQL query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubUser {
    pub contributions_collection: ContributionsCollection,
    #[serde(default)]
    pub repositories: RepositoryConnection,
}

impl GithubUser {
    pub fn stats(&self, today: NaiveDate) -> ContributionStats {
        let calendar = &self.contributions_collection.contribution_calendar;
        let days = calendar.days();
        let repositories = self.repositories.nodes.iter().flatten();

        ContributionStats {
            total_contributions: calendar.total_contributions,
            streaks: StreakResult::from_days(&days, today),
            languages: aggregate_languages(repositories),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreakResult {
    pub current: u32,
    pub longest: u32,
}

impl StreakResult {
    pub fn from_days(days: &[ContributionDay], today: NaiveDate) -> Self {
        Self {
            current: current_streak(days, today),
            longest: longest_streak(days),
        }
    }
}

pub fn longest_streak(days: &[ContributionDay]) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    for day in days {
        if day.count > 0 {
            run += 1;
        } else {
            longest = longest.max(run);
            run = 0;
        }
    }
    longest.max(run)
}

/// Counts consecutive active days ending at `today`, scanning backwards.
///
/// Days after `today` are ignored. A zero count on `today` itself does not break the
/// streak, since the day is not over yet. Any other zero day ends the scan.
pub fn current_streak(days: &[ContributionDay], today: NaiveDate) -> u32 {
    let mut streak = 0;
    for day in days.iter().rev() {
        if day.date > today {
            continue;
        }
        if day.count > 0 {
            streak += 1;
            continue;
        }
        if day.date == today && streak == 0 {
            continue;
        }
        break;
    }
    streak
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageUsage {
    pub name: String,
    pub color: String,
    pub size: u64,
    pub percentage: f64,
}

/// Folds language edges of every repository into a table keyed by language name.
///
/// Returns at most [`TOP_LANGUAGES`] entries, largest first. Equal sizes keep the order
/// in which the languages were first seen.
pub fn aggregate_languages<'a>(
    repositories: impl IntoIterator<Item = &'a RepositoryNode>,
) -> Vec<LanguageUsage> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut table: Vec<(&str, &str, u64)> = Vec::new();
    let mut total: u64 = 0;

    let edges = repositories
        .into_iter()
        .filter_map(|repo| repo.languages.as_ref())
        .flat_map(|languages| languages.edges.iter());

    for edge in edges {
        total += edge.size;
        match positions.get(edge.node.name.as_str()) {
            Some(&index) => table[index].2 += edge.size,
            None => {
                let color = edge.node.color.as_deref().unwrap_or(DEFAULT_LANGUAGE_COLOR);
                positions.insert(&edge.node.name, table.len());
                table.push((&edge.node.name, color, edge.size));
            }
        }
    }

    table
        .into_iter()
        .sorted_by(|a, b| b.2.cmp(&a.2))
        .take(TOP_LANGUAGES)
        .map(|(name, color, size)| LanguageUsage {
            name: name.to_string(),
            color: color.to_string(),
            size,
            percentage: percentage_of(size, total),
        })
        .collect()
}

fn percentage_of(size: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (size as f64 / total as f64 * 1000.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionStats {
    pub total_contributions: u32,
    pub streaks: StreakResult,
    pub languages: Vec<LanguageUsage>,
}
