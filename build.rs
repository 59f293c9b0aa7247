// Re-embed migrations into `sqlx::migrate!()` whenever they change.
fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
