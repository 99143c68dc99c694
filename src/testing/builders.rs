//! Builders for raw source rows.

use csv::{QuoteStyle, WriterBuilder};

/// A fluent builder for one raw CSV row of the trip source.
///
/// Every field starts at the value used by the source dataset for "nothing
/// special": `NA` for the optional columns, `False` for the flag and an empty
/// polyline.
///
/// # Example
///
/// ```
/// use taxi_trip_prep::testing::TripRowBuilder;
///
/// let line = TripRowBuilder::new("T1")
///     .start_time(1_400_000_000)
///     .locations(&[[1.0, 2.0], [1.1, 2.1]])
///     .to_csv_line();
///
/// assert!(line.starts_with("\"T1\""));
/// ```
#[derive(Debug, Clone)]
pub struct TripRowBuilder {
    fields: [String; 9],
}

impl TripRowBuilder {
    #[must_use]
    pub fn new(trip_id: &str) -> Self {
        Self {
            fields: [
                trip_id.to_string(),
                "NA".to_string(),
                "NA".to_string(),
                "NA".to_string(),
                "NA".to_string(),
                "NA".to_string(),
                "NA".to_string(),
                "False".to_string(),
                "[]".to_string(),
            ],
        }
    }

    #[must_use]
    pub fn call_type(self, v: &str) -> Self {
        self.set(1, v)
    }

    #[must_use]
    pub fn customer_id(self, v: &str) -> Self {
        self.set(2, v)
    }

    #[must_use]
    pub fn taxi_stand_id(self, v: &str) -> Self {
        self.set(3, v)
    }

    #[must_use]
    pub fn taxi_id(self, v: &str) -> Self {
        self.set(4, v)
    }

    #[must_use]
    pub fn start_time(self, secs: u64) -> Self {
        self.set(5, &secs.to_string())
    }

    /// Raw `trip_start_time` text, for rows that should fail the schema.
    #[must_use]
    pub fn start_time_raw(self, v: &str) -> Self {
        self.set(5, v)
    }

    #[must_use]
    pub fn surge_rate(self, v: &str) -> Self {
        self.set(6, v)
    }

    #[must_use]
    pub fn partial(self, flag: bool) -> Self {
        self.set(7, if flag { "True" } else { "False" })
    }

    /// Raw `partial_location_flag` text.
    #[must_use]
    pub fn partial_raw(self, v: &str) -> Self {
        self.set(7, v)
    }

    /// Polyline from points, encoded the way the source dataset encodes it.
    #[must_use]
    pub fn locations(self, points: &[[f64; 2]]) -> Self {
        let encoded = points
            .iter()
            .map(|[lon, lat]| format!("[{lon:?},{lat:?}]"))
            .collect::<Vec<_>>()
            .join(",");
        self.set(8, &format!("[{encoded}]"))
    }

    /// Raw `trip_location` text, e.g. invalid JSON.
    #[must_use]
    pub fn locations_raw(self, v: &str) -> Self {
        self.set(8, v)
    }

    /// The row as a single CSV line (no trailing newline), every field quoted.
    ///
    /// # Panics
    /// Panics if a field holds text the CSV writer rejects.
    #[must_use]
    pub fn to_csv_line(&self) -> String {
        let mut wtr = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        wtr.write_record(&self.fields).expect("Failed to write CSV row");
        let bytes = wtr.into_inner().expect("Failed to flush CSV row");
        String::from_utf8(bytes)
            .expect("CSV row is not UTF-8")
            .trim_end()
            .to_string()
    }

    fn set(mut self, i: usize, v: &str) -> Self {
        self.fields[i] = v.to_string();
        self
    }
}
