use rand::seq::SliceRandom;

/// Pick a random user agent from the pool
pub fn pick_user_agent(pool: &[String]) -> Option<&str> {
    pool.choose(&mut rand::thread_rng()).map(String::as_str)
}
