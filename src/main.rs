use starfield::StarfieldConfig;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => match StarfieldConfig::load(&path) {
            Ok(config) => {
                log::info!("loaded configuration from {}", path);
                config
            }
            Err(err) => {
                log::error!("could not load {}: {}", path, err);
                std::process::exit(1);
            }
        },
        None => StarfieldConfig::default(),
    };

    if let Err(err) = starfield::run(config) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
