mod cli;

fn main() -> anyhow::Result<()> {
    pinchframe::logging::init();
    cli::run()
}
