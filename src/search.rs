//! Satellite search results, paging and caching.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::config::RESULTS_PER_PAGE;

#[cfg(feature = "web")]
use {
    crate::config::{API_URL, MAX_PROPAGATION_DAYS, SATELLITE_CACHE_TTL, SEARCH_CACHE_TTL, VERSION},
    crate::error::Result,
    crate::freshness::{Decision, StaleCheck},
    crate::satellite::{Satellite, Tle},
    chrono::Utc,
    reqwest::header::ACCEPT,
    serde::{Deserialize, Serialize},
    tracing::{debug, info},
};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "web", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "web", serde(rename_all = "camelCase"))]
pub struct Member {
    pub satellite_id: u64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "web", derive(Serialize))]
pub struct SearchPage {
    pub search_term: String,
    pub page: u32,
    pub members: Vec<Member>,
    pub total_results: u64,
    pub pages: u64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl SearchPage {
    pub fn new(search_term: &str, page: u32, total_results: u64, members: Vec<Member>) -> Self {
        let per_page = RESULTS_PER_PAGE as u64;
        Self {
            search_term: search_term.to_string(),
            page,
            members,
            total_results,
            pages: total_results.div_ceil(per_page),
            has_prev: page > 1,
            has_next: total_results > page as u64 * per_page,
        }
    }
}

/// Map whose entries expire a fixed time after insertion.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, (Instant, V)>,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    /// Also sweeps every entry that has expired by `now`.
    pub fn insert_at(&mut self, key: K, value: V, now: Instant) {
        self.entries.retain(|_, (expires, _)| now < *expires);
        self.entries.insert(key, (now + self.ttl, value));
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.get_at(key, Instant::now())
    }

    /// Expired entries are dropped on lookup.
    pub fn get_at(&mut self, key: &K, now: Instant) -> Option<&V> {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|(expires, _)| now >= *expires);
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|(_, value)| value)
    }

    pub fn remove(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(feature = "web")]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPage {
    total_items: u64,
    #[serde(default)]
    member: Vec<Member>,
}

#[cfg(feature = "web")]
#[derive(Deserialize)]
struct ApiTle {
    name: String,
    line1: String,
    line2: String,
}

/// A satellite picked from search results, with how old its elements are.
#[cfg(feature = "web")]
pub struct Admission {
    pub satellite: Satellite,
    pub days_since_epoch: f64,
    pub check: StaleCheck,
}

/// Client for the TLE search API with cached pages and satellites.
#[cfg(feature = "web")]
pub struct Catalog {
    client: reqwest::blocking::Client,
    base_url: String,
    pages: TtlCache<(String, u32), SearchPage>,
    satellites: TtlCache<u64, Tle>,
}

#[cfg(feature = "web")]
impl Catalog {
    pub fn new() -> Result<Self> {
        Self::with_base_url(API_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("ground_track/{VERSION}"))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            pages: TtlCache::new(SEARCH_CACHE_TTL),
            satellites: TtlCache::new(SATELLITE_CACHE_TTL),
        })
    }

    pub fn search(&mut self, term: &str, page: u32) -> Result<SearchPage> {
        let key = (term.to_string(), page);
        if let Some(cached) = self.pages.get(&key) {
            debug!("Search cache hit for \"{term}\" page {page}");
            return Ok(cached.clone());
        }

        let page_param = page.to_string();
        let response: ApiPage = self
            .client
            .get(&self.base_url)
            .header(ACCEPT, "application/json")
            .query(&[("search", term), ("page", page_param.as_str())])
            .send()?
            .error_for_status()?
            .json()?;
        info!(
            "Search for \"{term}\" page {page} returned {} of {} results",
            response.member.len(),
            response.total_items
        );

        let result = SearchPage::new(term, page, response.total_items, response.member);
        self.pages.insert(key, result.clone());
        Ok(result)
    }

    /// Fetches and caches a satellite, flagging it when its elements are older
    /// than the propagation window.
    pub fn admit(&mut self, id: u64) -> Result<Admission> {
        let tle = self.fetch_tle(id)?;
        let satellite = Satellite::from_tle(tle.clone())?;
        self.cache_satellite(id, tle);

        let days_since_epoch = satellite.days_since_epoch(&Utc::now());
        let check = StaleCheck::assess(days_since_epoch, MAX_PROPAGATION_DAYS);
        Ok(Admission {
            satellite,
            days_since_epoch,
            check,
        })
    }

    /// Applies the user's decision; a cancelled satellite is evicted.
    pub fn resolve(&mut self, id: u64, check: StaleCheck, decision: Decision) -> StaleCheck {
        let next = check.apply(decision);
        if next == StaleCheck::Cancelled && self.evict(id) {
            info!("Evicted {id} from the satellite cache");
        }
        next
    }

    pub fn satellite(&mut self, id: u64) -> Result<Satellite> {
        match self.satellites.get(&id).cloned() {
            Some(tle) => Satellite::from_tle(tle),
            None => Ok(self.admit(id)?.satellite),
        }
    }

    pub fn evict(&mut self, id: u64) -> bool {
        self.satellites.remove(&id)
    }

    pub(crate) fn cache_satellite(&mut self, id: u64, tle: Tle) {
        self.satellites.insert(id, tle);
    }

    fn fetch_tle(&self, id: u64) -> Result<Tle> {
        let api: ApiTle = self
            .client
            .get(format!("{}/{id}", self.base_url))
            .header(ACCEPT, "application/json")
            .send()?
            .error_for_status()?
            .json()?;
        Ok(Tle {
            name: Some(api.name),
            line1: api.line1,
            line2: api.line2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page() {
        let page = SearchPage::new("ISS", 1, 45, vec![]);
        assert_eq!(page.pages, 3);
        assert!(!page.has_prev);
        assert!(page.has_next);
    }

    #[test]
    fn test_last_page_exactly_full() {
        let page = SearchPage::new("STARLINK", 2, 40, vec![]);
        assert_eq!(page.pages, 2);
        assert!(page.has_prev);
        assert!(!page.has_next);
    }

    #[test]
    fn test_no_results() {
        let page = SearchPage::new("nothing", 1, 0, vec![]);
        assert_eq!(page.pages, 0);
        assert!(!page.has_next);
    }

    #[test]
    fn test_cache_expiry() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.insert_at("ISS", 1, t0);

        assert_eq!(cache.get_at(&"ISS", t0 + Duration::from_secs(59)), Some(&1));
        assert_eq!(cache.get_at(&"ISS", t0 + Duration::from_secs(60)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_remove_and_overwrite() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", 1);
        cache.insert("a", 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"a"), Some(&2));
        assert!(cache.remove(&"a"));
        assert!(!cache.remove(&"a"));
    }

    #[test]
    fn test_insert_sweeps_expired_keys() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        for id in 0..10 {
            cache.insert_at(id, id, t0);
        }
        assert_eq!(cache.len(), 10);

        cache.insert_at(99, 99, t0 + Duration::from_secs(61));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_at(&99, t0 + Duration::from_secs(62)), Some(&99));
    }

    #[cfg(feature = "web")]
    fn offline_catalog() -> Catalog {
        let mut catalog = Catalog::with_base_url("http://localhost").unwrap();
        let tle = Tle::parse(crate::satellite::tests::ISS_TLE).unwrap();
        catalog.cache_satellite(25544, tle);
        catalog
    }

    #[cfg(feature = "web")]
    #[test]
    fn test_cancelled_satellite_is_evicted() {
        let mut catalog = offline_catalog();
        let next = catalog.resolve(25544, StaleCheck::Pending, Decision::Cancel);
        assert_eq!(next, StaleCheck::Cancelled);
        assert!(!catalog.evict(25544));
    }

    #[cfg(feature = "web")]
    #[test]
    fn test_confirmed_satellite_stays_cached() {
        let mut catalog = offline_catalog();
        let next = catalog.resolve(25544, StaleCheck::Pending, Decision::Confirm);
        assert_eq!(next, StaleCheck::Confirmed);
        let sat = catalog.satellite(25544).unwrap();
        assert_eq!(sat.elements.norad_id, 25544);
        assert!(catalog.evict(25544));
    }

    #[cfg(feature = "web")]
    #[test]
    fn test_api_page_deserializes() {
        let json = r#"{
            "totalItems": 2,
            "member": [
                {"@id": "x", "satelliteId": 25544, "name": "ISS (ZARYA)", "line1": "", "line2": ""},
                {"satelliteId": 49044, "name": "ISS (NAUKA)"}
            ]
        }"#;
        let page: ApiPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_items, 2);
        assert_eq!(page.member[1].satellite_id, 49044);
    }
}
