pub struct Limits {
    // Login and registration form limits
    pub max_email_length: usize,
    pub min_password_length: usize,
}

pub static LIMITS: Limits = Limits {
    max_email_length: 254,
    min_password_length: 8,
};
