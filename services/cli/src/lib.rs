mod cli;
mod demo;
mod infra;

use lexlot::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
