//! Binary entrypoint for typj-cli (made by FontLab https://www.fontlab.com/)

fn main() {
    if let Err(err) = typj_cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
