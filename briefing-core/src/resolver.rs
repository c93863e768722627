//! City name → [`Location`] via the QWeather geo lookup, with fuzzy
//! candidate scoring and a persistent cache in front.

use parking_lot::Mutex;
use tracing::{debug, info, instrument};

use crate::{
    error::{BriefingError, Result},
    geo_cache::GeoCache,
    http::QWeatherClient,
    model::Location,
    provider::response::{GeoCandidate, GeoLookupResponse, decode},
};

const CITY_LOOKUP_PATH: &str = "/geo/v2/city/lookup";
const LOOKUP_LIMIT: &str = "10";

/// Administrative suffixes stripped for the simplified form, longest first.
const ADMIN_SUFFIXES: [&str; 9] = ["自治州", "地区", "省", "市", "区", "县", "旗", "盟", "州"];

/// Suffixes marking a district/county/banner-level unit.
const DISTRICT_SUFFIXES: [char; 3] = ['区', '县', '旗'];

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Remove whitespace and every administrative suffix, e.g. `"深圳市南山区"` → `"深圳南山"`.
pub fn simplify_place_name(name: &str) -> String {
    ADMIN_SUFFIXES
        .iter()
        .fold(strip_whitespace(name), |acc, suffix| acc.replace(suffix, ""))
}

/// Score one geo candidate against the query; the second element breaks ties.
pub fn score_candidate(query: &str, candidate: &GeoCandidate) -> (u32, usize) {
    let query_raw = strip_whitespace(query);
    let query_simple = simplify_place_name(&query_raw);
    let prefers_district = query_raw.contains(DISTRICT_SUFFIXES);

    let name = candidate.name.as_str();
    let name_simple = simplify_place_name(name);

    let mut score = 0;
    if name == query_raw {
        score += 100;
    }
    if !name.is_empty() && query_raw.contains(name) {
        score += 60;
    }
    if name_simple == query_simple {
        score += 50;
    }
    if !name.is_empty() && query_simple.contains(&name_simple) {
        score += 30;
    }

    for adm in [&candidate.adm1, &candidate.adm2, &candidate.adm3] {
        let adm = adm.as_str();
        if adm.is_empty() {
            continue;
        }
        if query_raw.contains(adm) {
            score += 8;
        }
        if query_simple.contains(&simplify_place_name(adm)) {
            score += 5;
        }
    }

    if prefers_district && name.ends_with(DISTRICT_SUFFIXES) {
        score += 15;
    }

    if !candidate.adm3.is_empty() {
        score += 4;
    }

    (score, name.chars().count())
}

/// Highest-scoring candidate; ties go to the longer name, then to the earlier entry.
pub fn pick_best_location<'a>(query: &str, candidates: &'a [GeoCandidate]) -> Option<&'a GeoCandidate> {
    candidates
        .iter()
        .map(|c| (score_candidate(query, c), c))
        .fold(None, |best: Option<((u32, usize), &GeoCandidate)>, (score, c)| match best {
            Some((best_score, _)) if best_score >= score => best,
            _ => Some((score, c)),
        })
        .map(|(_, c)| c)
}

fn location_from_candidate(key: &str, candidate: &GeoCandidate) -> std::result::Result<Location, String> {
    let id = candidate.id.non_empty().ok_or("best candidate has no id")?;
    let lat = candidate.lat.float().ok_or("best candidate has no valid lat")?;
    let lon = candidate.lon.float().ok_or("best candidate has no valid lon")?;

    Ok(Location {
        id,
        name: candidate.name.non_empty().unwrap_or_else(|| key.to_string()),
        lat,
        lon,
        adm1: candidate.adm1.non_empty(),
        adm2: candidate.adm2.non_empty(),
        adm3: candidate.adm3.non_empty(),
        tz: candidate.tz.non_empty(),
    })
}

#[derive(Debug)]
pub struct LocationResolver {
    client: QWeatherClient,
    cache: Mutex<GeoCache>,
    city_range: String,
}

impl LocationResolver {
    pub fn new(client: QWeatherClient, cache: GeoCache, city_range: impl Into<String>) -> Self {
        Self {
            client,
            cache: Mutex::new(cache),
            city_range: city_range.into(),
        }
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, city_name: &str) -> Result<Location> {
        let key = city_name.trim();

        {
            let cache = self.cache.lock();
            if let Some(cached) = cache.get(key) {
                debug!(key, id = %cached.id, "Geocode cache hit");
                return Ok(cached);
            }
            debug!(key, entries = cache.len(), "Geocode cache miss");
        }

        let mut params = vec![("location", key), ("number", LOOKUP_LIMIT)];
        if !self.city_range.is_empty() {
            params.push(("range", self.city_range.as_str()));
        }
        let data = self.client.get_json(CITY_LOOKUP_PATH, &params).await?;
        let candidates = decode::<GeoLookupResponse>(CITY_LOOKUP_PATH, data.clone()).candidates();

        let lookup_error = |reason: &str| BriefingError::Lookup {
            query: city_name.to_string(),
            reason: reason.to_string(),
            payload: data.clone(),
        };

        let best = pick_best_location(key, &candidates).ok_or_else(|| lookup_error("no candidates"))?;
        let location = location_from_candidate(key, best).map_err(|reason| lookup_error(&reason))?;

        info!(
            key,
            id = %location.id,
            name = %location.name,
            candidates = candidates.len(),
            "Resolved location"
        );

        self.cache.lock().set(key, &location, Some(best.raw.clone()));
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn raw(value: Value) -> GeoCandidate {
        GeoCandidate::from_raw(value).unwrap()
    }

    fn candidate(name: &str, adm1: &str, adm2: &str, adm3: &str) -> GeoCandidate {
        raw(json!({ "id": name, "name": name, "lat": "1.0", "lon": "2.0", "adm1": adm1, "adm2": adm2, "adm3": adm3 }))
    }

    #[test]
    fn simplify_strips_admin_suffixes() {
        assert_eq!(simplify_place_name("深圳市南山区"), "深圳南山");
        assert_eq!(simplify_place_name("延边朝鲜族自治州"), "延边朝鲜族");
        assert_eq!(simplify_place_name(" 阿拉善 盟 "), "阿拉善");
        assert_eq!(simplify_place_name("大兴安岭地区"), "大兴安岭");
    }

    #[test]
    fn exact_name_match_scores_highest_terms() {
        // 100 exact + 60 substring + 50 simplified equal + 30 simplified substring,
        // adm1 only matches simplified ("北京市" is not in the raw query), adm2 matches both.
        let score = score_candidate("北京", &candidate("北京", "北京市", "北京", ""));
        assert_eq!(score, (100 + 60 + 50 + 30 + 5 + 8 + 5, 2));
    }

    #[test]
    fn district_query_prefers_district_candidate() {
        let candidates = vec![
            candidate("深圳", "广东省", "深圳", ""),
            candidate("南山", "广东省", "深圳", ""),
            candidate("南山区", "广东省", "深圳", "南山区"),
        ];

        let best = pick_best_location("深圳市南山区", &candidates).unwrap();
        assert_eq!(best.name.as_str(), "南山区");
    }

    #[test]
    fn adm_fields_disambiguate_same_name() {
        let candidates = vec![
            candidate("朝阳", "辽宁省", "朝阳", ""),
            candidate("朝阳", "北京市", "北京", ""),
        ];

        let best = pick_best_location("北京朝阳", &candidates).unwrap();
        assert_eq!(best.adm1.as_str(), "北京市");
    }

    #[test]
    fn ties_break_toward_longer_name_then_first() {
        let candidates = vec![raw(json!({ "id": "a", "name": "ab" })), raw(json!({ "id": "b", "name": "abc" }))];
        let (a, b) = (
            score_candidate("zzz", &candidates[0]),
            score_candidate("zzz", &candidates[1]),
        );
        assert_eq!(a.0, b.0);
        assert_eq!(pick_best_location("zzz", &candidates).unwrap().id.as_str(), "b");

        let equal = vec![raw(json!({ "id": "first", "name": "xy" })), raw(json!({ "id": "second", "name": "xy" }))];
        assert_eq!(pick_best_location("zzz", &equal).unwrap().id.as_str(), "first");
    }

    #[test]
    fn picking_is_deterministic() {
        let candidates = vec![
            candidate("朝阳", "辽宁省", "朝阳", ""),
            candidate("朝阳区", "北京市", "北京", "朝阳区"),
            candidate("朝阳县", "辽宁省", "朝阳", "朝阳县"),
        ];

        let first = pick_best_location("朝阳区", &candidates).unwrap();
        for _ in 0..5 {
            assert_eq!(pick_best_location("朝阳区", &candidates).unwrap(), first);
        }
        assert_eq!(first.name.as_str(), "朝阳区");
    }

    #[test]
    fn empty_candidates_pick_nothing() {
        assert!(pick_best_location("北京", &[]).is_none());
    }

    #[test]
    fn location_from_candidate_parses_coordinates_and_drops_empty_adm() {
        let nanshan = raw(json!({
            "id": "101280604", "name": "南山", "lat": "22.53122", "lon": "113.92942",
            "adm1": "广东省", "adm2": "深圳", "adm3": "", "tz": "Asia/Shanghai"
        }));

        let loc = location_from_candidate("南山", &nanshan).unwrap();
        assert_eq!(loc.lat, 22.53122);
        assert_eq!(loc.adm3, None);
        assert_eq!(loc.tz.as_deref(), Some("Asia/Shanghai"));

        let nameless = raw(json!({ "id": "1", "lat": 1, "lon": 2 }));
        assert_eq!(location_from_candidate("某地", &nameless).unwrap().name, "某地");

        let bad = raw(json!({ "id": "1", "name": "x", "lat": "north", "lon": "2" }));
        assert!(location_from_candidate("x", &bad).is_err());
    }
}
