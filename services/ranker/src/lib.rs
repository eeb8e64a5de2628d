mod cli;
mod demo;
mod infra;
mod render;

use expert_match::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
