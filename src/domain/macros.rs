#[macro_export]
macro_rules! number_wrapper {
    ($name:ident, $value_type:ty) => {
        #[derive(
            Copy, Clone,
            Debug, derive_more::Display,
            PartialEq, Eq, Hash, PartialOrd, Ord,
            derive_more::Constructor, derive_more::From, derive_more::FromStr,
            serde::Serialize, serde::Deserialize,
            sqlx::Type
        )]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name($value_type);

        impl std::ops::Deref for $name {
            type Target = $value_type;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl $name {
            pub fn value(&self) -> $value_type {
                self.0
            }
        }
    };
}

#[macro_export]
macro_rules! id {
    ($name:ident) => {
        $crate::number_wrapper!($name, i64);
    };
    ($($name:ident),+) => {
        $($crate::id!($name);)+
    }
}
