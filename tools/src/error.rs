use anyhow::Error;

pub fn die(error: &Error) -> ! {
    eprintln!("Error: {}", error);
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {}", cause);
    }
    std::process::exit(1);
}

pub fn or_die<T>(result: Result<T, Error>) -> T {
    match result {
        Ok(t) => t,
        Err(ref e) => die(e),
    }
}
