use solstice::cli;

fn main() {
    std::process::exit(cli::run());
}
