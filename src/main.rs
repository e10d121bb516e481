fn main() -> std::process::ExitCode {
    review_healer_lib::run()
}
