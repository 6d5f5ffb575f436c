use crate::{
    format, Aggregator, Error, MeterKey, Padding, RawRow, Resampler, Store, Timestamp, Value,
    DEFAULT_START,
};
use regex::Regex;
use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

const MAINS_LABEL: &str = "mains";

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();

    #[allow(clippy::expect_used)]
    PATTERN.get_or_init(|| {
        Regex::new(r"^(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01])$").expect("pattern is valid")
    })
}

/// Builder for [`Pipeline`].
#[derive(Clone, Debug)]
pub struct PipelineBuilder {
    source_dir: PathBuf,
    output_dir: PathBuf,
    date: String,
    scale: i64,
    start: Timestamp,
    unit_factor: Value,
    padding: Padding,
    building: u32,
    store_path: Option<PathBuf>,
}

impl PipelineBuilder {
    /// Sets the output directory.
    ///
    /// Meters are written to `<output>/building<N>/elec/meter<M>.csv`.
    ///
    /// Default = source directory
    #[must_use]
    pub fn output_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_dir = path.into();
        self
    }

    /// Sets the generation date (`mm-dd`) that is part of every input file name.
    #[must_use]
    pub fn date<S: Into<String>>(mut self, date: S) -> Self {
        self.date = date.into();
        self
    }

    /// Sets the number of raw samples averaged into one output sample.
    ///
    /// Default = 1
    #[must_use]
    pub fn scale(mut self, scale: i64) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the timestamp (Unix seconds) of the first raw row.
    ///
    /// Default = 2022-01-01T00:00:00Z
    #[must_use]
    pub fn start(mut self, ts: Timestamp) -> Self {
        self.start = ts;
        self
    }

    /// Sets a factor every averaged value is multiplied with.
    ///
    /// Default = 1000.0 (appliance recordings are in kilowatts)
    #[must_use]
    pub fn unit_factor(mut self, factor: Value) -> Self {
        self.unit_factor = factor;
        self
    }

    /// Sets how resampled traces are padded.
    ///
    /// Default = [`Padding::RawLength`]
    #[must_use]
    pub fn padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the building number.
    ///
    /// Default = 1
    #[must_use]
    pub fn building(mut self, building: u32) -> Self {
        self.building = building;
        self
    }

    /// If set, all written meters are also imported into a [`Store`] at this path.
    #[must_use]
    pub fn store<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.store_path = Some(path.into());
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the date is not `mm-dd`, the
    /// building number is zero, or the resampling options are invalid.
    pub fn build(self) -> crate::Result<Pipeline> {
        if !date_pattern().is_match(&self.date) {
            return Err(Error::InvalidConfiguration(format!(
                "date must be mm-dd, got {:?}",
                self.date
            )));
        }

        let mains = MeterKey::new(self.building, 1).ok_or_else(|| {
            Error::InvalidConfiguration("building number must be positive".into())
        })?;

        let resampler = Resampler::builder()
            .scale(self.scale)
            .start(self.start)
            .unit_factor(self.unit_factor)
            .padding(self.padding)
            .build()?;

        Ok(Pipeline {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            date: self.date,
            mains,
            resampler,
            store_path: self.store_path,
        })
    }
}

/// A meter written by the pipeline
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrittenMeter {
    /// Meter key
    pub key: MeterKey,

    /// Appliance label (`mains` for the synthesized meter)
    pub label: String,

    /// Output file
    pub path: PathBuf,

    /// Number of data rows written
    pub rows: usize,
}

/// Summary of a pipeline run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// All written meters, mains first
    pub meters: Vec<WrittenMeter>,

    /// Number of cells counted as zero while synthesizing the mains trace
    pub malformed_cells: usize,

    /// Number of meters imported into the store
    pub stored: usize,
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} meters written, {} malformed cells, {} stored",
            self.meters.len(),
            self.malformed_cells,
            self.stored
        )?;

        for meter in &self.meters {
            writeln!(
                f,
                "  {} ({}): {} rows -> {}",
                meter.key,
                meter.label,
                meter.rows,
                meter.path.display()
            )?;
        }

        Ok(())
    }
}

/// Prepares a dataset directory for disaggregation.
///
/// Every sub-directory `<name>` of the source directory holds the recording of
/// one appliance in `<name>(<date>).csv`. Appliances are taken in name order,
/// resampled and written as submeters 2, 3, ... of the building. Their sum is
/// then written as meter 1 (mains).
///
/// All paths are explicit; the process working directory is never changed.
#[derive(Clone, Debug)]
pub struct Pipeline {
    source_dir: PathBuf,
    output_dir: PathBuf,
    date: String,
    mains: MeterKey,
    resampler: Resampler,
    store_path: Option<PathBuf>,
}

impl Pipeline {
    /// Returns a builder to configure a pipeline reading from `source_dir`.
    #[must_use]
    pub fn builder<P: Into<PathBuf>>(source_dir: P) -> PipelineBuilder {
        let source_dir = source_dir.into();

        PipelineBuilder {
            output_dir: source_dir.clone(),
            source_dir,
            date: String::new(),
            scale: 1,
            start: DEFAULT_START,
            unit_factor: crate::recorder::KILO,
            padding: Padding::default(),
            building: 1,
            store_path: None,
        }
    }

    /// Lists appliance folders (sub-directories of the source directory) by name.
    fn appliance_folders(&self) -> crate::Result<Vec<String>> {
        let mut folders = vec![];

        for entry in std::fs::read_dir(&self.source_dir)? {
            let entry = entry?;

            if !entry.file_type()?.is_dir() {
                continue;
            }

            match entry.file_name().into_string() {
                Ok(name) => folders.push(name),
                Err(name) => log::warn!("skipping folder with non UTF-8 name {name:?}"),
            }
        }

        folders.sort();

        Ok(folders)
    }

    fn input_path(&self, folder: &str) -> PathBuf {
        self.source_dir
            .join(folder)
            .join(format!("{folder}({}).csv", self.date))
    }

    fn meter_path(&self, key: MeterKey) -> PathBuf {
        self.output_dir.join(key.relative_path())
    }

    /// Runs the pipeline.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred, there are no appliance folders or
    /// any input is malformed. All appliances are resampled and summed before any
    /// output is written, so a malformed recording leaves no meter files behind.
    pub fn run(&self) -> crate::Result<Report> {
        let folders = self.appliance_folders()?;

        if folders.is_empty() {
            return Err(Error::InvalidConfiguration(format!(
                "no appliance folders in {:?}",
                self.source_dir
            )));
        }

        log::info!(
            "preparing {} appliances from {:?} (scale {})",
            folders.len(),
            self.source_dir,
            self.resampler.scale(),
        );

        let mut jobs = Vec::with_capacity(folders.len());

        for (idx, folder) in folders.into_iter().enumerate() {
            let input = self.input_path(&folder);

            if !input.try_exists()? {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("missing recording {}", input.display()),
                )));
            }

            let key = u32::try_from(idx + 2)
                .ok()
                .and_then(|meter| MeterKey::new(self.mains.building(), meter))
                .ok_or_else(|| Error::InvalidConfiguration("too many appliances".into()))?;

            jobs.push((key, folder, input));
        }

        let mut resampled = Vec::with_capacity(jobs.len());

        for (key, label, input) in jobs {
            log::debug!("resampling {input:?} into {key}");

            let samples = self.resampler.resample(&format::read_meter_file(&input)?)?;
            resampled.push((key, label, samples));
        }

        // Submeters are summed as the text they are written as
        let traces = resampled
            .iter()
            .map(|(_, _, samples)| {
                samples
                    .iter()
                    .map(|s| RawRow::new(s.timestamp.to_string(), s.value.to_string()))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        let aggregated = Aggregator::new().aggregate(&traces)?;

        let mut submeters = Vec::with_capacity(resampled.len());

        for (key, label, samples) in resampled {
            let path = self.meter_path(key);

            format::write_meter_file(&path, samples.iter().map(|s| (s.timestamp, s.value)))?;

            submeters.push(WrittenMeter {
                key,
                label,
                path,
                rows: samples.len(),
            });
        }

        let mains_path = self.meter_path(self.mains);

        format::write_meter_file(
            &mains_path,
            aggregated
                .rows
                .iter()
                .map(|row| (row.timestamp.as_str(), row.value)),
        )?;

        log::info!(
            "synthesized {} from {} submeters ({} rows)",
            self.mains,
            submeters.len(),
            aggregated.rows.len(),
        );

        let mut report = Report {
            meters: Vec::with_capacity(submeters.len() + 1),
            malformed_cells: aggregated.malformed_cells,
            stored: 0,
        };

        report.meters.push(WrittenMeter {
            key: self.mains,
            label: MAINS_LABEL.into(),
            path: mains_path,
            rows: aggregated.rows.len(),
        });
        report.meters.extend(submeters);

        if let Some(store_path) = &self.store_path {
            report.stored = Self::store(store_path, &report.meters)?;
        }

        Ok(report)
    }

    fn store(path: &Path, meters: &[WrittenMeter]) -> crate::Result<usize> {
        let store = Store::builder().open(path)?;

        for meter in meters {
            store.import_csv(meter.key, &meter.label, &meter.path)?;
        }

        store.persist()?;
        log::info!("imported {} meters into {path:?}", meters.len());

        Ok(meters.len())
    }
}
