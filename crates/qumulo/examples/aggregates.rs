//! Example: Show capacity of a directory and its immediate subdirectories
//!
//! Run with: cargo run -p qumulo --example aggregates -- <address> <user> <password> <path>

use qumulo::{FileRef, FileSystem, RestClient};

fn main() -> qumulo::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [address, username, password, path] = args.as_slice() else {
        eprintln!("usage: aggregates <address> <user> <password> <path>");
        std::process::exit(2);
    };

    let mut client = RestClient::new(address, qumulo::DEFAULT_PORT, false);
    client.login(username, password)?;
    println!("Cluster: {}", client.cluster_name()?);

    let agg = client.aggregates(&FileRef::path(path.as_str()))?;
    println!("\n{:>14} {:>14}  {}", "data", "metadata", "path");
    println!("{:-<60}", "");
    println!("{:>14} {:>14}  {}", agg.total_data, agg.total_meta, agg.path);

    for child in agg.files.iter().filter(|f| f.file_type.is_directory()) {
        let attrs = client.attributes(&FileRef::Id(child.id))?;
        println!(
            "{:>14} {:>14}  {}",
            child.data_usage, child.meta_usage, attrs.path
        );
    }

    Ok(())
}
