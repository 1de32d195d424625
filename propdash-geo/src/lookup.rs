use crate::district_key;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// One district's entry in the lookup file. Both the bare-list form and the
/// `{"General Location": [...]}` form are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LookupEntry {
    Areas(Vec<String>),
    Described {
        #[serde(rename = "General Location")]
        general_location: Vec<String>,
    },
}

impl LookupEntry {
    fn into_areas(self) -> Vec<String> {
        match self {
            LookupEntry::Areas(areas) => areas,
            LookupEntry::Described { general_location } => general_location,
        }
    }
}

/// The lookup file's top-level object, with its keys in file order.
struct LookupFile(Vec<(String, LookupEntry)>);

struct LookupFileVisitor;

impl<'de> Visitor<'de> for LookupFileVisitor {
    type Value = LookupFile;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of district codes to planning areas")
    }

    fn visit_map<A>(self, mut map: A) -> Result<LookupFile, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((district, entry)) = map.next_entry::<String, LookupEntry>()? {
            entries.push((district, entry));
        }
        Ok(LookupFile(entries))
    }
}

impl<'de> Deserialize<'de> for LookupFile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(LookupFileVisitor)
    }
}

/// District code to the planning-area names it contains.
///
/// Districts keep the order they were given in (file order for
/// [`DistrictLookup::from_json`]); that order decides which district owns an
/// area listed more than once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistrictLookup {
    districts: Vec<(String, Vec<String>)>,
}

fn area_key(name: &str) -> String {
    name.trim().to_uppercase()
}

impl DistrictLookup {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<String>)>,
        S: AsRef<str>,
    {
        let mut districts: Vec<(String, Vec<String>)> = Vec::new();
        for (district, areas) in entries {
            let key = district_key(district.as_ref());
            match districts.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, known)) => known.extend(areas),
                None => districts.push((key, areas)),
            }
        }
        DistrictLookup { districts }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let LookupFile(raw) = serde_json::from_str(json)?;
        let lookup = DistrictLookup::new(raw.into_iter().map(|(k, v)| (k, v.into_areas())));
        log::info!("lookup: Loaded planning areas for {} districts", lookup.len());
        Ok(lookup)
    }

    pub fn len(&self) -> usize {
        self.districts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }

    pub fn areas(&self, district: &str) -> Option<&[String]> {
        let key = district_key(district);
        self.districts
            .iter()
            .find(|(code, _)| *code == key)
            .map(|(_, areas)| areas.as_slice())
    }

    /// Planning-area name (upper-cased) to district code.
    ///
    /// Districts are visited in their given order, so an area listed under
    /// several districts belongs to the first of them.
    pub fn reverse_index(&self) -> HashMap<String, String> {
        let mut index: HashMap<String, String> = HashMap::new();
        for (district, areas) in &self.districts {
            for area in areas {
                let key = area_key(area);
                match index.get(&key) {
                    Some(owner) if owner != district => {
                        log::debug!(
                            "lookup: Area {} listed under districts {} and {}, keeping {}",
                            area,
                            owner,
                            district,
                            owner
                        );
                    }
                    Some(_) => {}
                    None => {
                        index.insert(key, district.clone());
                    }
                }
            }
        }
        index
    }

    /// Resolve a planning-area name through a prebuilt reverse index.
    pub fn resolve<'a>(index: &'a HashMap<String, String>, area: &str) -> Option<&'a str> {
        index.get(&area_key(area)).map(|s| s.as_str())
    }
}
