pub mod roles {

    pub const ADMIN_ROLE_ID: i32 = 1;

    pub const ADMIN_ROLE_NAME: &str = "admin";

    pub const DEFAULT_ROLE_ID: i32 = 2;

    pub const DEFAULT_ROLE_NAME: &str = "default";
}

pub mod accounts {

    pub const MIN_PASSWORD_LENGTH: usize = 8;

    /// Default avatars are picked from image ids `1..=AVATAR_POOL_SIZE`.
    pub const AVATAR_POOL_SIZE: i32 = 10;
}

pub mod coordinates {

    /// `decimal(9, 6)`: six fractional digits, three integer digits.
    pub const DECIMAL_PLACES: i32 = 6;

    pub const MAX_ABS_VALUE: f64 = 1000.0;
}
