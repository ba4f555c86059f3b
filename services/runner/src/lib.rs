mod batch;

use mortgage_status::error::AppError;

/// One classification run, configured from the environment.
pub fn run() -> Result<(), AppError> {
    batch::run()
}
