fn main() -> std::process::ExitCode {
    concierge_cli::run()
}
