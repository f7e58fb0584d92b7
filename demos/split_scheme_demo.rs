use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    split_schemes::example_apps::run_split_scheme_demo(std::env::args().skip(1))
}
