use std::{
    collections::HashMap,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{
    error::{AppError, AppResult},
    models::{parse_price, split_amenities, Availability, Listing, ListingId},
};

/// Immutable in-memory snapshot of the listings table
///
/// A snapshot never changes after it is built. `reload` reads the file again
/// and returns a new snapshot, leaving this one untouched.
#[derive(Debug, Clone)]
pub struct ListingStore {
    path: PathBuf,
    listings: Arc<[Listing]>,
    loaded_at: DateTime<Utc>,
}

impl ListingStore {
    /// Reads the listings table at `path`
    ///
    /// Any I/O or parse failure is reported as a malformed input file.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| AppError::malformed(path, format!("cannot open: {}", e)))?;
        let listings = parse_listings(file, path)?;

        tracing::info!(
            path = %path.display(),
            listings = listings.len(),
            "Loaded listings snapshot"
        );

        Ok(Self::from_listings(path, listings))
    }

    /// Builds a snapshot from already-parsed listings
    pub fn from_listings(path: impl Into<PathBuf>, listings: Vec<Listing>) -> Self {
        Self {
            path: path.into(),
            listings: listings.into(),
            loaded_at: Utc::now(),
        }
    }

    /// Reads the same file again into a fresh snapshot
    pub fn reload(&self) -> AppResult<Self> {
        Self::load(&self.path)
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    /// Shared handle to the snapshot rows
    pub fn snapshot(&self) -> Arc<[Listing]> {
        Arc::clone(&self.listings)
    }

    pub fn get(&self, id: ListingId) -> Option<&Listing> {
        self.listings.iter().find(|listing| listing.id == id)
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// Positions of the known columns in the header row
struct Columns {
    id: usize,
    location: usize,
    name: Option<usize>,
    property_type: Option<usize>,
    price: Option<usize>,
    capacity: Option<usize>,
    bedrooms: Option<usize>,
    rating: Option<usize>,
    reviews_count: Option<usize>,
    amenities: Option<usize>,
    description: Option<usize>,
    availability: Option<usize>,
    image_url: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord, path: &Path) -> AppResult<Self> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_lowercase(), i))
            .collect();
        let find = |names: &[&str]| names.iter().find_map(|n| index.get(*n).copied());
        let require = |names: &[&str]| {
            find(names).ok_or_else(|| {
                AppError::malformed(path, format!("missing required column `{}`", names[0]))
            })
        };

        Ok(Self {
            id: require(&["listing_id", "id"])?,
            location: require(&["location", "city"])?,
            name: find(&["name", "title"]),
            property_type: find(&["property_type", "type"]),
            price: find(&["price_per_night", "price"]),
            capacity: find(&["capacity", "max_guests", "accommodates"]),
            bedrooms: find(&["bedrooms"]),
            rating: find(&["rating"]),
            reviews_count: find(&["reviews_count"]),
            amenities: find(&["amenities"]),
            description: find(&["description"]),
            availability: find(&["availability"]),
            image_url: find(&["image_url"]),
        })
    }
}

/// Parses listings CSV text; optional columns may be absent
pub fn parse_listings<R: Read>(reader: R, path: &Path) -> AppResult<Vec<Listing>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::malformed(path, e.to_string()))?
        .clone();
    let columns = Columns::resolve(&headers, path)?;

    let mut listings = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AppError::malformed(path, e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        listings.push(parse_row(&record, &columns, path, line)?);
    }

    Ok(listings)
}

fn parse_row(
    record: &StringRecord,
    columns: &Columns,
    path: &Path,
    line: u64,
) -> AppResult<Listing> {
    let cell = |idx: Option<usize>| {
        idx.and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("nan"))
    };

    let raw_id = cell(Some(columns.id))
        .ok_or_else(|| AppError::malformed(path, format!("line {}: missing listing id", line)))?;
    let id = parse_id(raw_id).ok_or_else(|| {
        AppError::malformed(path, format!("line {}: invalid listing id `{}`", line, raw_id))
    })?;
    let location = cell(Some(columns.location)).unwrap_or_default();

    Ok(Listing {
        id,
        name: cell(columns.name).map(str::to_string),
        location: location.to_string(),
        property_type: cell(columns.property_type).map(str::to_string),
        price_per_night: cell(columns.price).and_then(parse_price),
        capacity: cell(columns.capacity).and_then(parse_count),
        bedrooms: cell(columns.bedrooms).and_then(parse_count),
        rating: cell(columns.rating).and_then(|v| v.parse().ok()),
        reviews_count: cell(columns.reviews_count).and_then(parse_count),
        amenities: cell(columns.amenities).map(split_amenities).unwrap_or_default(),
        description: cell(columns.description).unwrap_or_default().to_string(),
        availability: cell(columns.availability)
            .map(Availability::parse)
            .unwrap_or_default(),
        image_url: cell(columns.image_url).map(str::to_string),
    })
}

/// Accepts integral ids, including the `12.0` form spreadsheet exports produce
fn parse_id(raw: &str) -> Option<ListingId> {
    raw.parse::<ListingId>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0 && *v >= 0.0)
            .map(|v| v as ListingId)
    })
}

fn parse_count(raw: &str) -> Option<u32> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
listing_id,name,location,property_type,price_per_night,bedrooms,rating,reviews_count,amenities,availability,description
1,Loft du Marais,Paris,Apartment,$100,1,4.8,120,\"WiFi, Kitchen\",Available,Bright loft near the river
2,Villa Aurelia,Rome,Villa,\"1,200\",4,4.9,45,Pool;Parking,Booked,Quiet villa with garden
";

    fn parse(text: &str) -> AppResult<Vec<Listing>> {
        parse_listings(text.as_bytes(), Path::new("listings.csv"))
    }

    #[test]
    fn test_parse_full_rows() {
        let listings = parse(SAMPLE).unwrap();
        assert_eq!(listings.len(), 2);

        let loft = &listings[0];
        assert_eq!(loft.id, 1);
        assert_eq!(loft.name.as_deref(), Some("Loft du Marais"));
        assert_eq!(loft.location, "Paris");
        assert_eq!(loft.price_per_night, Some(100.0));
        assert_eq!(loft.effective_capacity(), Some(2));
        assert_eq!(loft.amenities, vec!["WiFi", "Kitchen"]);
        assert!(loft.is_available());

        let villa = &listings[1];
        assert_eq!(villa.price_per_night, Some(1200.0));
        assert_eq!(villa.amenities, vec!["Pool", "Parking"]);
        assert_eq!(villa.availability, Availability::Booked);
        assert_eq!(villa.reviews_count, Some(45));
    }

    #[test]
    fn test_tolerates_missing_optional_columns() {
        let listings = parse("id,city\n7,Lisbon\n8.0,Porto\n").unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].id, 7);
        assert_eq!(listings[1].id, 8);
        assert_eq!(listings[1].location, "Porto");
        assert!(listings[0].price_per_night.is_none());
        assert!(listings[0].amenities.is_empty());
        assert!(listings[0].is_available());
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let listings = parse("listing_id,location,price\n3,Nice\n").unwrap();
        assert_eq!(listings[0].price_per_night, None);
    }

    #[test]
    fn test_missing_required_column_is_malformed() {
        let err = parse("listing_id,price\n1,100\n").unwrap_err();
        assert!(matches!(err, AppError::MalformedInputFile { .. }));
        assert!(err.to_string().contains("location"));
    }

    #[test]
    fn test_invalid_id_is_malformed() {
        let err = parse("listing_id,location\nabc,Paris\n").unwrap_err();
        assert!(matches!(err, AppError::MalformedInputFile { .. }));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_load_missing_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let err = ListingStore::load(dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, AppError::MalformedInputFile { .. }));
    }

    #[test]
    fn test_reload_produces_new_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "listing_id,location\n1,Paris\n").unwrap();
        file.flush().unwrap();

        let store = ListingStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 1);
        let before = store.snapshot();

        let mut handle = std::fs::OpenOptions::new()
            .append(true)
            .open(file.path())
            .unwrap();
        writeln!(handle, "2,Rome").unwrap();

        let reloaded = store.reload().unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(before.len(), 1);
        assert_eq!(reloaded.get(2).map(|l| l.location.as_str()), Some("Rome"));
    }
}
