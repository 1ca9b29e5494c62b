/// Display name of the plugin
pub const PLUGIN_NAME: &str = "DT Plugin";
/// Plugin slug: menu slug, option namespace and `dt_plugins` key
pub const PLUGIN_SLUG: &str = "dt-plugin";
pub const TEXT_DOMAIN: &str = "dt-plugin";
/// Current version of the plugin
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Prefix of namespaced hook and type names
pub const NAMESPACE: &str = "DT\\Plugin";

// Host lifecycle hooks
pub const INIT_ACTION: &str = "init";
pub const WP_LOADED_ACTION: &str = "wp_loaded";
pub const ADMIN_MENU_ACTION: &str = "admin_menu";
pub const ADMIN_NOTICES_ACTION: &str = "admin_notices";
pub const TEMPLATE_REDIRECT_ACTION: &str = "template_redirect";
pub const DT_PLUGINS_FILTER: &str = "dt_plugins";
pub const MAGIC_URL_TYPES_FILTER: &str = "dt_magic_url_register_types";
