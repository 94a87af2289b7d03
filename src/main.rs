mod entry;
mod logger;
mod shutdown;
mod shutdown_handlers;

use pacebench::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
