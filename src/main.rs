fn main() -> anyhow::Result<()> {
    kira_mirtop::cli::run::entry()
}
