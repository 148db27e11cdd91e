fn main() -> anyhow::Result<()> {
    lead_search::cli::run()
}
