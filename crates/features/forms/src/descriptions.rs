//! Human-readable names, descriptions and comments, keyed by option name
//! (`Servers_host`) or form name (`Form_Server`).

use crate::schema::Description;

const fn d(name: &'static str, desc: &'static str, cmt: &'static str) -> Description {
    Description { name, desc, cmt }
}

pub(crate) static TABLE: &[(&str, Description)] = &[
    // Forms
    ("Form_Server", d("Basic settings", "", "")),
    ("Form_Server_auth", d("Authentication", "Authentication settings.", "")),
    ("Form_Server_config", d("Server configuration", "Advanced server configuration, do not change these options unless you know what they are for.", "")),
    ("Form_Server_pmadb", d("Configuration storage", "Configure phpMyAdmin configuration storage to gain access to additional features.", "")),
    ("Form_General", d("General", "Set some commonly used options.", "")),
    ("Form_Text_fields", d("Text fields", "Customize text input fields.", "")),
    ("Form_Console", d("Console", "", "")),
    ("Form_Security", d("Security", "Please note that phpMyAdmin is just a user interface and its features do not limit the database server.", "")),
    ("Form_Other_core", d("Other core settings", "Settings that didn't fit anywhere else.", "")),
    ("Form_Sql_queries", d("SQL queries", "SQL queries settings.", "")),
    ("Form_Sql_box", d("SQL Query box", "Customize links shown in SQL Query boxes.", "")),
    ("Form_Navi_panel", d("Navigation panel", "Customize appearance of the navigation panel.", "")),
    ("Form_Navi_databases", d("Databases", "Databases display options.", "")),
    ("Form_Startup", d("Startup", "Customize startup page.", "")),
    ("Form_Browse", d("Browse mode", "Customize browse mode.", "")),
    ("Form_Edit", d("Edit mode", "Customize edit mode.", "")),
    ("Form_Tabs", d("Tabs", "Choose how you want tabs to work.", "")),
    ("Form_Import_defaults", d("Import defaults", "Customize default common import options.", "")),
    ("Form_Csv", d("CSV", "Customize default options.", "")),
    ("Form_Ldi", d("CSV using LOAD DATA", "Customize default options.", "")),
    ("Form_Export_defaults", d("Export defaults", "Customize default export options.", "")),
    // General
    ("DefaultLang", d("Default language", "", "")),
    ("ServerDefault", d("Default server", "Default server to connect to, 0 shows the server choice.", "")),
    ("NumRecentTables", d("Recently used tables", "Maximum number of recently used tables; set 0 to disable.", "")),
    ("ShowHint", d("Show hints", "Whether to show hint or not.", "")),
    ("ShowStats", d("Show statistics", "Allow to display database and table statistics (eg. space usage).", "")),
    ("ShowServerInfo", d("Show detailed MySQL server information", "", "")),
    ("UserprefsDeveloperTab", d("Enable the Developer tab in settings", "", "")),
    ("VersionCheck", d("Version check", "Enables check for latest version on main phpMyAdmin page.", "")),
    // Security
    ("AllowArbitraryServer", d("Allow login to any MySQL server", "If enabled, user can enter any MySQL server in login form for cookie auth.", "")),
    ("LoginCookieValidity", d("Login cookie validity", "Define how long (in seconds) a login cookie is valid.", "")),
    ("LoginCookieStore", d("Login cookie store", "Define how long (in seconds) a login cookie should be stored in browser. The default of 0 means that it will be kept for the existing session only.", "")),
    ("TrustedProxies", d("List of trusted proxies for IP allow/deny", "Input proxies as IP: trusted HTTP header. The following example specifies that phpMyAdmin should trust a HTTP_X_FORWARDED_FOR (X-Forwarded-For) header coming from the proxy 1.2.3.4: 1.2.3.4: HTTP_X_FORWARDED_FOR", "")),
    ("CheckConfigurationPermissions", d("Check config file permissions", "", "")),
    // Core
    ("MemoryLimit", d("Memory limit", "The number of bytes a script is allowed to allocate, eg. 32M (-1 for no limit and 0 for no change).", "")),
    ("ExecTimeLimit", d("Maximum execution time", "Set the number of seconds a script is allowed to run ([kbd]0[/kbd] for no limit).", "")),
    ("RecodingEngine", d("Recoding engine", "Select which functions will be used for character set conversion.", "")),
    ("IconvExtraParams", d("Extra parameters for iconv", "", "")),
    ("ZipDump", d("ZIP", "Enable ZIP compression for import and export operations.", "")),
    ("GZipDump", d("GZip", "Enable gzip compression for import and export operations.", "")),
    ("BZipDump", d("Bzip2", "Enable bzip2 compression for import operations.", "")),
    ("CompressOnFly", d("Compress on the fly", "Compress gzip exports on the fly without the need for much memory; if you encounter problems with created gzip files disable this feature.", "")),
    // Text fields and editing
    ("CharTextareaCols", d("CHAR columns editing", "Number of columns for CHAR/VARCHAR textareas.", "")),
    ("CharTextareaRows", d("CHAR textarea rows", "Number of rows for CHAR/VARCHAR textareas.", "")),
    ("TextareaCols", d("Textarea columns", "Textarea size (columns) in edit mode, this value will be emphasized for SQL query textareas (*2).", "")),
    ("TextareaRows", d("Textarea rows", "Textarea size (rows) in edit mode, this value will be emphasized for SQL query textareas (*2).", "")),
    ("LimitChars", d("Limit column characters", "Maximum number of characters shown in any non-numeric column on browse view.", "")),
    ("ProtectBinary", d("Protect binary columns", "Disallow BLOB and BINARY columns from editing.", "")),
    // SQL queries
    ("ShowSQL", d("Show SQL queries", "Defines whether SQL queries generated by phpMyAdmin should be displayed.", "")),
    ("Confirm", d("Confirm DROP queries", "Whether a warning (\"Are your really sure…\") should be displayed when you're about to lose data.", "")),
    ("QueryHistoryDB", d("Permanent query history", "Enable if you want DB-based query history (requires phpMyAdmin configuration storage). If disabled, this utilizes JS-routines to display query history (lost by window close).", "")),
    ("QueryHistoryMax", d("Query history length", "How many queries are kept in history.", "")),
    ("IgnoreMultiSubmitErrors", d("Ignore multiple statement errors", "If enabled, phpMyAdmin continues computing multiple-statement queries even if one of the queries failed.", "")),
    ("MaxCharactersInDisplayedSQL", d("Maximum displayed SQL length", "Maximum number of characters used when a SQL query is displayed.", "")),
    ("SQLQuery_Edit", d("Edit", "", "")),
    ("SQLQuery_Explain", d("Explain SQL", "", "")),
    ("SQLQuery_ShowAsPHP", d("Create PHP code", "", "")),
    ("SQLQuery_Refresh", d("Refresh", "", "")),
    // Navigation
    ("NavigationDisplayLogo", d("Display logo", "Show logo in navigation panel.", "")),
    ("FirstLevelNavigationItems", d("Maximum items on first level", "The number of items that can be displayed on each page on the first level of the navigation tree.", "")),
    ("NavigationTreeDbSeparator", d("Database tree separator", "String that separates databases into different tree levels.", "")),
    ("NavigationTreeEnableGrouping", d("Group items in the tree", "Group items in the navigation tree (determined by the separator defined in the Databases and Tables tabs above).", "")),
    ("ShowDatabasesNavigationAsTree", d("Show databases navigation as tree", "In the navigation panel, replaces the database tree with a selector.", "")),
    ("NavigationTreeDisplayDbFilterMinimum", d("Minimum number of databases to display the database filter box", "", "")),
    ("MaxDbList", d("Maximum databases", "Maximum number of databases displayed in database list.", "")),
    ("MaxTableList", d("Maximum tables", "Maximum number of tables displayed in table list.", "")),
    // Main panel
    ("MaxRows", d("Maximum number of rows to display", "Number of rows displayed when browsing a result set. If the result set contains more rows, \"Previous\" and \"Next\" links will be shown.", "")),
    ("Order", d("Default sorting order", "SMART - i.e. descending order for columns of type TIME, DATE, DATETIME and TIMESTAMP, ascending order otherwise.", "")),
    ("RepeatCells", d("Repeat headers", "Repeat the headers every X cells, [kbd]0[/kbd] deactivates this feature.", "")),
    ("TabsMode", d("How to display the menu tabs", "", "")),
    ("DefaultTabServer", d("Default server tab", "Tab that is displayed when entering a server.", "")),
    ("DefaultTabDatabase", d("Default database tab", "Tab that is displayed when entering a database.", "")),
    ("DefaultTabTable", d("Default table tab", "Tab that is displayed when entering a table.", "")),
    // Console
    ("Console_Mode", d("Mode", "Console mode", "")),
    ("Console_Height", d("Console height", "", "")),
    ("Console_StartHistory", d("Show query history at start", "", "")),
    ("Console_AlwaysExpand", d("Always expand query messages", "", "")),
    // Servers
    ("Servers_verbose", d("Verbose name of this server", "Hostname where MySQL server is running.", "")),
    ("Servers_host", d("Server hostname", "Hostname where MySQL server is running.", "")),
    ("Servers_port", d("Server port", "Port on which MySQL server is listening, leave empty for default.", "")),
    ("Servers_socket", d("Server socket", "Socket on which MySQL server is listening, leave empty for default.", "")),
    ("Servers_ssl", d("Use SSL", "", "")),
    ("Servers_compress", d("Compress connection", "Compress connection to MySQL server.", "")),
    ("Servers_auth_type", d("Authentication type", "Authentication method to use.", "")),
    ("Servers_user", d("User for config auth", "Leave empty if not using config auth.", "")),
    ("Servers_password", d("Password for config auth", "Leave empty if not using config auth.", "")),
    ("Servers_SignonSession", d("Signon session name", "See authentication types for an example.", "")),
    ("Servers_SignonURL", d("Signon URL", "", "")),
    ("Servers_LogoutURL", d("Logout URL", "", "")),
    ("Servers_hide_db", d("Hide databases", "Hide databases matching regular expression (PCRE).", "")),
    ("Servers_AllowRoot", d("Allow root login", "", "")),
    ("Servers_AllowNoPassword", d("Allow logins without a password", "", "")),
    ("Servers_AllowDeny_order", d("Host authorization order", "Leave blank if not used.", "")),
    ("Servers_AllowDeny_rules", d("Host authorization rules", "Leave blank for defaults.", "")),
    ("Servers_pmadb", d("Database name", "Database used for relations, bookmarks, and PDF features. See [doc@linked-tables]pmadb[/doc] for complete information. Leave blank for no support.", "")),
    ("Servers_controlhost", d("Control host", "An alternate host to hold the configuration storage; leave blank to use the already defined host.", "")),
    ("Servers_controluser", d("Control user", "A special MySQL user configured with limited permissions.", "")),
    ("Servers_controlpass", d("Control user password", "", "")),
    ("Servers_bookmarktable", d("Bookmark table", "Leave blank for no bookmark support.", "")),
    ("Servers_relation", d("Relation table", "Leave blank for no relation-links support.", "")),
    ("Servers_table_info", d("Display columns table", "Table to describe the display columns, leave blank for no support.", "")),
    ("Servers_history", d("SQL query history table", "Leave blank for no SQL query history support.", "")),
    ("Servers_recent", d("Recently used table", "Leave blank for no \"persistent\" recently used tables across sessions.", "")),
    ("Servers_favorite", d("Favorites table", "Leave blank for no \"persistent\" favorite tables across sessions.", "")),
    ("Servers_userconfig", d("User preferences storage table", "Leave blank for no user preferences storage in database.", "")),
    // Import
    ("Import_format", d("Format of imported file", "Default format; be aware that this list depends on location (database, table) and only SQL is always available.", "")),
    ("Import_allow_interrupt", d("Partial import: allow interrupt", "Allow interrupt of import in case script detects it is close to time limit. This might be a good way to import large files, however it can break transactions.", "")),
    ("Import_skip_queries", d("Partial import: skip queries", "Number of queries to skip from start.", "")),
    ("Import_csv_replace", d("Update data when duplicate keys found on import", "", "")),
    ("Import_csv_ignore", d("Do not abort on INSERT error", "", "")),
    ("Import_csv_terminated", d("Columns terminated with", "", "")),
    ("Import_csv_enclosed", d("Columns enclosed with", "", "")),
    ("Import_csv_escaped", d("Columns escaped with", "", "")),
    ("Import_csv_new_line", d("Lines terminated with", "", "")),
    ("Import_csv_columns", d("Column names", "", "")),
    ("Import_csv_col_names", d("Lines terminated with", "", "")),
    ("Import_ldi_replace", d("Replace table data with file", "", "")),
    ("Import_ldi_ignore", d("Do not abort on INSERT error", "", "")),
    ("Import_ldi_terminated", d("Columns terminated with", "", "")),
    ("Import_ldi_enclosed", d("Columns enclosed with", "", "")),
    ("Import_ldi_escaped", d("Columns escaped with", "", "")),
    ("Import_ldi_new_line", d("Lines terminated with", "", "")),
    ("Import_ldi_columns", d("Column names", "", "")),
    ("Import_ldi_local_option", d("Use LOCAL keyword", "", "")),
    // Export
    ("Export_format", d("Format", "", "")),
    ("Export_compression", d("Compression", "", "")),
    ("Export_asfile", d("Save as file", "", "")),
    ("Export_charset", d("Character set of the file", "", "")),
    ("Export_onserver", d("Save on server", "", "")),
    ("Export_file_template_table", d("Table name template", "", "")),
    ("Export_remember_file_template", d("Remember file name template", "", "")),
];
