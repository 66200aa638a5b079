use quicksearch_core::{logging, runtime};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match runtime::parse_cli_args(&args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("[quicksearch-core] {error}");
            std::process::exit(2);
        }
    };

    let logging = if options.verbose {
        logging::init_stderr(true)
    } else {
        logging::init()
            .map(|_| ())
            .or_else(|_| logging::init_stderr(false))
    };
    if let Err(error) = logging {
        eprintln!("[quicksearch-core] logging disabled: {error}");
    }

    if let Err(error) = runtime::run_with_options(options) {
        tracing::error!("replay failed: {error}");
        eprintln!("[quicksearch-core] replay failed: {error}");
        std::process::exit(1);
    }
}
