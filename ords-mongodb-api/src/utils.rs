/// Appends a short random suffix so parallel test runs never share container or network names
pub fn unique_name(name: &str) -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", name, &uuid[..8])
}

/// Number of connections the client may establish concurrently, one per available CPU
pub fn available_parallelism() -> u32 {
    std::thread::available_parallelism().map(|n| n.get() as u32).unwrap_or(1)
}
