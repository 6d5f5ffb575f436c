use nilm_prep::{
    format, recorder, Aggregator, Error, MeterKey, Padding, Pipeline, Resampler, Store,
};
use std::path::Path;

fn write_meter(path: &Path, values: &[&str]) -> nilm_prep::Result<()> {
    let mut contents = String::from(",power\n,apparent\n");

    for (idx, value) in values.iter().enumerate() {
        contents.push_str(&format!("{},{value}\n", 1_641_024_000 + idx));
    }

    std::fs::write(path, contents)?;
    Ok(())
}

#[test_log::test]
fn synthesize_mains_from_submeters() -> nilm_prep::Result<()> {
    let dir = tempfile::tempdir()?;

    let paths = ["meter2.csv", "meter3.csv", "meter4.csv"].map(|name| dir.path().join(name));
    write_meter(&paths[0], &["1", "2", "3", "4", "5"])?;
    write_meter(&paths[1], &["10", "20", "30", "40", "50"])?;
    write_meter(&paths[2], &["100", "200", "x", "400", "500"])?;

    let mains = dir.path().join("meter1.csv");
    let aggregated = Aggregator::new().aggregate_files(&paths, &mains)?;

    assert_eq!(1, aggregated.malformed_cells);
    assert_eq!(
        ",power\n,apparent\n\
         1641024000,111\n\
         1641024001,222\n\
         1641024002,33\n\
         1641024003,444\n\
         1641024004,555\n",
        std::fs::read_to_string(&mains)?
    );

    Ok(())
}

#[test_log::test]
fn short_submeter_fails_without_output() -> nilm_prep::Result<()> {
    let dir = tempfile::tempdir()?;

    let long = dir.path().join("meter2.csv");
    let short = dir.path().join("meter3.csv");
    write_meter(&long, &["1", "2", "3"])?;
    write_meter(&short, &["1", "2"])?;

    let mains = dir.path().join("meter1.csv");

    match Aggregator::new().aggregate_files(&[&long, &short], &mains) {
        Err(Error::TraceLengthMismatch {
            trace,
            expected,
            actual,
        }) => {
            assert_eq!((1, 3, 2), (trace, expected, actual));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    assert!(!mains.try_exists()?);

    Ok(())
}

#[test_log::test]
fn recorder_export_to_store() -> nilm_prep::Result<()> {
    let dir = tempfile::tempdir()?;

    let export = dir.path().join("export.csv");
    std::fs::write(
        &export,
        "timestamp,active\n1641024000,0.5\n1641024001,0.75\n1641024002,0\n",
    )?;

    let meter = MeterKey::try_from("/building1/elec/meter2")?;
    let csv = dir.path().join(meter.relative_path());

    assert_eq!(3, recorder::convert_export(&export, &csv)?);

    let rows = format::read_meter_file(&csv)?;
    assert_eq!(3, rows.len());

    let store = Store::builder().open(dir.path().join("store"))?;
    store.import_csv(meter, "microwave", &csv)?;

    assert_eq!(
        vec![500.0, 750.0, 0.0],
        store
            .read_trace(meter)?
            .iter()
            .map(|s| s.value)
            .collect::<Vec<_>>()
    );

    Ok(())
}

#[test_log::test]
fn resample_then_aggregate() -> nilm_prep::Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("allCSV");

    for (name, values) in [
        ("hairDryer", ["2", "4", "6", "8", "10", "12", "99"]),
        ("kettle", ["1", "1", "1", "1", "1", "1", "1"]),
    ] {
        let folder = source.join(name);
        std::fs::create_dir_all(&folder)?;
        write_meter(&folder.join(format!("{name}(11-15).csv")), &values)?;
    }

    let report = Pipeline::builder(&source)
        .output_dir(dir.path())
        .date("11-15")
        .scale(3)
        .unit_factor(1.0)
        .padding(Padding::BucketCount)
        .build()?
        .run()?;

    assert_eq!(3, report.meters.len());
    assert!(report.meters.iter().all(|m| m.rows == 3));

    let mains = format::read_meter_file(dir.path().join("building1/elec/meter1.csv"))?;
    assert_eq!(
        vec![Some(5.0), Some(11.0), Some(0.0)],
        mains.iter().map(nilm_prep::RawRow::try_value).collect::<Vec<_>>()
    );

    // Same numbers as resampling the hair dryer on its own
    let resampler = Resampler::builder()
        .scale(3)
        .padding(Padding::BucketCount)
        .build()?;
    let hair_dryer = resampler.resample(&format::read_meter_file(
        source.join("hairDryer/hairDryer(11-15).csv"),
    )?)?;
    assert_eq!(
        vec![4.0, 10.0, 0.0],
        hair_dryer.iter().map(|s| s.value).collect::<Vec<_>>()
    );

    Ok(())
}

#[test_log::test]
fn padded_trace_keeps_buckets_in_store() -> nilm_prep::Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("allCSV");
    let store_path = dir.path().join("store");

    let folder = source.join("fan");
    std::fs::create_dir_all(&folder)?;
    write_meter(&folder.join("fan(03-04).csv"), &["1", "1", "1", "2", "2", "2"])?;

    Pipeline::builder(&source)
        .date("03-04")
        .scale(3)
        .start(100)
        .unit_factor(1.0)
        .store(&store_path)
        .build()?
        .run()?;

    let store = Store::builder().open(&store_path)?;
    let fan = MeterKey::try_from("/building1/elec/meter2")?;
    let trace = store.read_trace(fan)?;

    assert_eq!(
        vec![
            (99, 1.0),
            (102, 2.0),
            (106, 0.0),
            (107, 0.0),
            (108, 0.0),
            (109, 0.0),
        ],
        trace
            .iter()
            .map(|s| (s.timestamp, s.value))
            .collect::<Vec<_>>()
    );
    assert_eq!(6, store.meter(fan)?.map(|info| info.len).unwrap_or_default());

    Ok(())
}
