//! UI state that outlives a page: which date groups are expanded, and which links were already visited

use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{OPEN_DATES_STORAGE_KEY, VISITED_LINK_LIFETIME_MONTHS};
use crate::resource::{CardNavigation, Resource};
use crate::utils;

/// UI state, stored in a local JSON file
#[derive(Debug, PartialEq)]
pub struct UiState {
    backing_file: PathBuf,
    data: StoredState,
}

#[derive(Default, Debug, PartialEq, Serialize, Deserialize)]
struct StoredState {
    #[serde(rename = "seminar_detail_open_dates", default)]
    open_dates: BTreeSet<String>,
    #[serde(rename = "clickedLinks", default, deserialize_with = "deserialize_visited_links")]
    visited_links: BTreeMap<String, VisitedLink>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisitedLink {
    #[serde(rename = "expirationDate")]
    pub expiration_date: DateTime<Utc>,
}

/// Older versions stored visited links as a plain list. Such links are migrated with an immediate expiry
fn deserialize_visited_links<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<String, VisitedLink>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Current(BTreeMap<String, VisitedLink>),
        Legacy(Vec<String>),
    }

    Ok(match Stored::deserialize(deserializer)? {
        Stored::Current(links) => links,
        Stored::Legacy(links) => {
            log::info!("Migrating {} visited links from the legacy format", links.len());
            let now = Utc::now();
            links.into_iter()
                .map(|link| (link, VisitedLink { expiration_date: now }))
                .collect()
        },
    })
}

impl UiState {
    /// The default location of the state file of a seminar
    pub fn default_path(dir: &Path, seminar_name: &str) -> PathBuf {
        let file_name = sanitize_filename::sanitize(format!("{}.{}.json", seminar_name, OPEN_DATES_STORAGE_KEY));
        dir.join(file_name)
    }

    /// Initialize a state from the content of a valid backing file if it exists.
    /// Returns an error otherwise
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let data = match std::fs::File::open(path) {
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(file) => serde_json::from_reader(file)?,
        };

        Ok(Self{
            backing_file: PathBuf::from(path),
            data,
        })
    }

    /// Initialize a state with the default contents
    pub fn new(path: &Path) -> Self {
        Self{
            backing_file: PathBuf::from(path),
            data: StoredState::default(),
        }
    }

    /// Load the state file, or start from an empty state if it is missing or unreadable
    pub fn load_or_new(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(state) => state,
            Err(err) => {
                log::debug!("Starting with an empty UI state: {}", err);
                Self::new(path)
            },
        }
    }

    pub fn backing_file(&self) -> &Path {
        &self.backing_file
    }

    /// Store the current state to its backing file
    pub fn save_to_file(&self) {
        let path = &self.backing_file;
        let file = match std::fs::File::create(path) {
            Err(err) => {
                log::warn!("Unable to save file {:?}: {}", path, err);
                return;
            },
            Ok(f) => f,
        };

        if let Err(err) = serde_json::to_writer(file, &self.data) {
            log::warn!("Unable to serialize: {}", err);
        };
    }


    /// The date keys of the expanded groups
    pub fn open_dates(&self) -> &BTreeSet<String> {
        &self.data.open_dates
    }

    pub fn is_open(&self, date: NaiveDate) -> bool {
        self.data.open_dates.contains(&utils::date_key(date))
    }

    /// Records whether a group is expanded. Returns whether something changed
    pub fn set_open(&mut self, date: NaiveDate, open: bool) -> bool {
        let key = utils::date_key(date);
        if open {
            self.data.open_dates.insert(key)
        } else {
            self.data.open_dates.remove(&key)
        }
    }


    pub fn visited_links(&self) -> &BTreeMap<String, VisitedLink> {
        &self.data.visited_links
    }

    /// Remembers a link as visited for a few months.
    ///
    /// Only `http(s)` links are tracked. Visiting a link again does not extend its expiry.
    /// Returns whether the link was added
    pub fn mark_visited(&mut self, link: &str, now: DateTime<Utc>) -> bool {
        if link.starts_with("http") == false {
            return false;
        }
        if self.data.visited_links.contains_key(link) {
            return false;
        }
        let expiration_date = now.checked_add_months(Months::new(VISITED_LINK_LIFETIME_MONTHS))
            .unwrap_or(now);
        self.data.visited_links.insert(link.to_string(), VisitedLink { expiration_date });
        true
    }

    /// Follow the link of a seminar card. Only pages of the site itself are remembered as visited
    pub fn follow_card(&mut self, resource: &Resource, href: &str, now: DateTime<Utc>) -> CardNavigation {
        let navigation = resource.card_navigation(href);
        if let CardNavigation::SameTab(url) = &navigation {
            self.mark_visited(url.as_str(), now);
        }
        navigation
    }

    pub fn is_visited(&self, link: &str) -> bool {
        link.starts_with("http") && self.data.visited_links.contains_key(link)
    }

    /// Forgets the links which expiry is before `now`. Returns how many were removed
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.data.visited_links.len();
        self.data.visited_links.retain(|_, visit| visit.expiration_date >= now);
        before - self.data.visited_links.len()
    }
}
