/// Macro to register games in the catalog.
///
/// Every listed module must expose
/// `pub fn init(ctx: &HostContext, report: ScoreReporter) -> InitResult`.
///
/// Usage in games/mod.rs:
/// ```ignore
/// register_games! {
///     snake => {
///         id: "snake",
///         name: "Snake",
///         category: Arcade,
///         description: "Eat food, avoid walls."
///     },
///     guess => {
///         id: "guess",
///         name: "Number Guess",
///         category: Puzzle,
///         description: "1-100 guessing game."
///     }
/// }
/// ```
#[macro_export]
macro_rules! register_games {
    (
        $(
            $module:ident => {
                id: $id:expr,
                name: $name:expr,
                category: $category:ident,
                description: $desc:expr
            }
        ),* $(,)?
    ) => {
        /// All games, in catalog order.
        pub fn get_all_games() -> Vec<$crate::core::registry::GameDescriptor> {
            vec![
                $(
                    $crate::core::registry::GameDescriptor {
                        id: $id,
                        name: $name,
                        category: $crate::core::registry::Category::$category,
                        description: $desc,
                        factory: ::std::rc::Rc::new($crate::games::$module::init),
                    }
                ),*
            ]
        }

        /// Get a game by ID
        pub fn get_game(id: &str) -> Option<$crate::core::registry::GameDescriptor> {
            get_all_games().into_iter().find(|g| g.id == id)
        }

        /// Registry holding every built-in game.
        pub fn create_default_registry() -> ::anyhow::Result<$crate::core::registry::GameRegistry> {
            $crate::core::registry::GameRegistry::new(get_all_games()).map_err(::anyhow::Error::from)
        }
    };
}
