use docgate::errors::GatewayResult;
use docgate::filter::{all, Filterlet};
use docgate::gateway::Gateway;
use docgate::gateway_config::GatewayConfig;
use docgate::store::InMemoryStore;
use docgate::Value;

fn main() -> GatewayResult<()> {
    colog::init();
    println!("Starting stress run...");

    let gateway = Gateway::connect(GatewayConfig::default(), InMemoryStore::new())?;
    let collection = gateway.database().collection("stress");

    let count = 100_000;

    let start = std::time::Instant::now();
    for i in 0..count {
        let body = Value::from_json(&format!(
            r#"{{"n": {}, "bucket": "{}", "flag": {}}}"#,
            i,
            i % 10,
            i % 2 == 0
        ))?;
        let result = collection.set(&format!("key-{}", i), body);
        assert!(result.is_success(), "upsert failed: {}", result);
    }
    println!("Upserted {} documents in {:?}", count, start.elapsed());

    let start = std::time::Instant::now();
    let everything = collection.find(&all())?;
    println!(
        "Materialized {} documents in {:?}",
        everything.len(),
        start.elapsed()
    );

    let start = std::time::Instant::now();
    let bucket = collection.find(&all().add("bucket", Filterlet::new().equals("3")))?;
    println!(
        "Filtered query matched {} documents in {:?}",
        bucket.len(),
        start.elapsed()
    );

    let start = std::time::Instant::now();
    let streamed = collection.find_as_stream(&all(), 64)?.count();
    println!("Streamed {} documents in {:?}", streamed, start.elapsed());

    let start = std::time::Instant::now();
    let mut stream = collection.find_as_stream(&all(), 0)?;
    let handle = stream.cancel_handle();
    let taken = stream.by_ref().take(count / 10).count();
    handle.cancel();
    drop(stream);
    println!(
        "Consumed {} then cancelled stream in {:?}",
        taken,
        start.elapsed()
    );

    Ok(())
}
