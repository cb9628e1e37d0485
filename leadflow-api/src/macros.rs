//! Utility macros

/// Implements `FromRef<AppState>` for each listed field, so handlers can
/// extract `State<DbClient>` and friends directly.
///
/// ```ignore
/// impl_from_ref!(db: DbClient, config: Arc<ApiConfig>);
/// ```
#[macro_export]
macro_rules! impl_from_ref {
    ($($field:ident: $type:ty),+ $(,)?) => {
        $(
            impl axum::extract::FromRef<$crate::state::AppState> for $type {
                fn from_ref(state: &$crate::state::AppState) -> Self {
                    state.$field.clone()
                }
            }
        )+
    };
}
