use std::io::Write;

use env_logger::{Builder, Env};
use log::LevelFilter;

pub fn init_logger() {
    // Базовый фильтр, переопределяемый через переменные окружения
    let env = Env::default().filter_or("RUST_LOG", "warn,storyreel=info");

    let mut builder = Builder::from_env(env);

    builder
        .filter_module("hyper", LevelFilter::Error)
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("mio", LevelFilter::Error)
        .filter_module("tokio_util", LevelFilter::Error)
        // Форматирование логов
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();
}
