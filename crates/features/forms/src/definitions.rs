//! Static option tables: defaults, type overrides, persisted options,
//! validators and the form layout.

use crate::form::FieldSpec::{Group, GroupEnd, Nested, Option as Opt, Preset};
use crate::form::{FormGroup, FormSpec};
use crate::schema::Literal::{self, Bool, EmptyList, EmptyMap, Int, Str};
use crate::schema::{DbEntry, OptionType, ValueList};
use crate::validator::ValidatorSpec;

pub(crate) static DEFAULTS: &[(&str, Literal)] = &[
    // General
    ("DefaultLang", Str("en")),
    ("ServerDefault", Int(1)),
    ("NumRecentTables", Int(10)),
    ("ShowHint", Bool(true)),
    ("ShowStats", Bool(true)),
    ("ShowServerInfo", Bool(true)),
    ("UserprefsDisallow", EmptyList),
    ("UserprefsDeveloperTab", Bool(false)),
    ("VersionCheck", Bool(true)),
    // Security
    ("AllowArbitraryServer", Bool(false)),
    ("LoginCookieValidity", Int(1440)),
    ("LoginCookieStore", Int(0)),
    ("TrustedProxies", EmptyMap),
    ("CheckConfigurationPermissions", Bool(true)),
    // Core
    ("MemoryLimit", Str("-1")),
    ("ExecTimeLimit", Int(300)),
    ("RecodingEngine", Str("auto")),
    ("IconvExtraParams", Str("//TRANSLIT")),
    ("ZipDump", Bool(true)),
    ("GZipDump", Bool(true)),
    ("BZipDump", Bool(true)),
    ("CompressOnFly", Bool(true)),
    // Text fields and editing
    ("CharTextareaCols", Int(40)),
    ("CharTextareaRows", Int(7)),
    ("TextareaCols", Int(40)),
    ("TextareaRows", Int(15)),
    ("LimitChars", Int(50)),
    ("ProtectBinary", Str("blob")),
    // SQL queries
    ("ShowSQL", Bool(true)),
    ("Confirm", Bool(true)),
    ("QueryHistoryDB", Bool(false)),
    ("QueryHistoryMax", Int(25)),
    ("IgnoreMultiSubmitErrors", Bool(false)),
    ("MaxCharactersInDisplayedSQL", Int(1000)),
    ("SQLQuery/Edit", Bool(true)),
    ("SQLQuery/Explain", Bool(true)),
    ("SQLQuery/ShowAsPHP", Bool(true)),
    ("SQLQuery/Refresh", Bool(false)),
    // Navigation
    ("NavigationDisplayLogo", Bool(true)),
    ("FirstLevelNavigationItems", Int(100)),
    ("NavigationTreeDbSeparator", Str("_")),
    ("NavigationTreeEnableGrouping", Bool(true)),
    ("ShowDatabasesNavigationAsTree", Bool(true)),
    ("NavigationTreeDisplayDbFilterMinimum", Int(30)),
    ("MaxDbList", Int(100)),
    ("MaxTableList", Int(250)),
    // Main panel
    ("MaxRows", Int(25)),
    ("Order", Str("SMART")),
    ("RepeatCells", Int(100)),
    ("TabsMode", Str("both")),
    ("DefaultTabServer", Str("welcome")),
    ("DefaultTabDatabase", Str("structure")),
    ("DefaultTabTable", Str("browse")),
    // Console
    ("Console/Mode", Str("info")),
    ("Console/Height", Int(92)),
    ("Console/StartHistory", Bool(false)),
    ("Console/AlwaysExpand", Bool(false)),
    // Servers
    ("Servers/1/verbose", Str("")),
    ("Servers/1/host", Str("localhost")),
    ("Servers/1/port", Str("")),
    ("Servers/1/socket", Str("")),
    ("Servers/1/ssl", Bool(false)),
    ("Servers/1/compress", Bool(false)),
    ("Servers/1/auth_type", Str("cookie")),
    ("Servers/1/user", Str("root")),
    ("Servers/1/password", Str("")),
    ("Servers/1/SignonSession", Str("")),
    ("Servers/1/SignonURL", Str("")),
    ("Servers/1/LogoutURL", Str("")),
    ("Servers/1/hide_db", Str("")),
    ("Servers/1/AllowRoot", Bool(true)),
    ("Servers/1/AllowNoPassword", Bool(false)),
    ("Servers/1/AllowDeny/order", Str("")),
    ("Servers/1/AllowDeny/rules", EmptyList),
    ("Servers/1/pmadb", Str("")),
    ("Servers/1/controlhost", Str("")),
    ("Servers/1/controluser", Str("")),
    ("Servers/1/controlpass", Str("")),
    ("Servers/1/bookmarktable", Str("")),
    ("Servers/1/relation", Str("")),
    ("Servers/1/table_info", Str("")),
    ("Servers/1/history", Str("")),
    ("Servers/1/recent", Str("")),
    ("Servers/1/favorite", Str("")),
    ("Servers/1/userconfig", Str("")),
    // Import
    ("Import/format", Str("sql")),
    ("Import/allow_interrupt", Bool(true)),
    ("Import/skip_queries", Int(0)),
    ("Import/csv_replace", Bool(false)),
    ("Import/csv_ignore", Bool(false)),
    ("Import/csv_terminated", Str(",")),
    ("Import/csv_enclosed", Str("\"")),
    ("Import/csv_escaped", Str("\"")),
    ("Import/csv_new_line", Str("auto")),
    ("Import/csv_columns", Str("")),
    ("Import/csv_col_names", Bool(false)),
    ("Import/ldi_replace", Bool(false)),
    ("Import/ldi_ignore", Bool(false)),
    ("Import/ldi_terminated", Str(";")),
    ("Import/ldi_enclosed", Str("\"")),
    ("Import/ldi_escaped", Str("\\")),
    ("Import/ldi_new_line", Str("auto")),
    ("Import/ldi_columns", Str("")),
    ("Import/ldi_local_option", Str("auto")),
    // Export
    ("Export/format", Str("sql")),
    ("Export/compression", Str("none")),
    ("Export/asfile", Bool(true)),
    ("Export/charset", Str("")),
    ("Export/onserver", Bool(false)),
    ("Export/file_template_table", Str("@TABLE@")),
    ("Export/remember_file_template", Bool(true)),
];

pub(crate) static DB_ENTRIES: &[(&str, DbEntry)] = &[
    ("DefaultLang", DbEntry::Values(ValueList::Labeled(&[
        (Str("en"), "English"),
        (Str("de"), "Deutsch"),
        (Str("fr"), "Français"),
        (Str("uk"), "Українська"),
    ]))),
    ("RecodingEngine", DbEntry::Values(ValueList::Plain(&[
        Str("auto"),
        Str("iconv"),
        Str("recode"),
        Str("mb"),
        Str("none"),
    ]))),
    ("ProtectBinary", DbEntry::Values(ValueList::Plain(&[
        Bool(false),
        Str("blob"),
        Str("noblob"),
        Str("all"),
    ]))),
    ("MaxRows", DbEntry::Values(ValueList::Plain(&[Int(25), Int(50), Int(100), Int(250), Int(500)]))),
    ("Order", DbEntry::Values(ValueList::Plain(&[Str("ASC"), Str("DESC"), Str("SMART")]))),
    ("TabsMode", DbEntry::Values(ValueList::Labeled(&[
        (Str("icons"), "Icons"),
        (Str("text"), "Text"),
        (Str("both"), "Both"),
    ]))),
    ("DefaultTabServer", DbEntry::Values(ValueList::Labeled(&[
        (Str("welcome"), "Welcome"),
        (Str("databases"), "Databases"),
        (Str("status"), "Status"),
        (Str("variables"), "Variables"),
        (Str("privileges"), "Privileges"),
    ]))),
    ("DefaultTabDatabase", DbEntry::Values(ValueList::Labeled(&[
        (Str("structure"), "Structure"),
        (Str("sql"), "SQL"),
        (Str("search"), "Search"),
        (Str("operations"), "Operations"),
    ]))),
    ("DefaultTabTable", DbEntry::Values(ValueList::Labeled(&[
        (Str("structure"), "Structure"),
        (Str("sql"), "SQL"),
        (Str("search"), "Search"),
        (Str("insert"), "Insert"),
        (Str("browse"), "Browse"),
    ]))),
    ("NavigationTreeDbSeparator", DbEntry::Type(OptionType::ShortString)),
    ("Console/Mode", DbEntry::Values(ValueList::Labeled(&[
        (Str("info"), "Info"),
        (Str("show"), "Show"),
        (Str("collapse"), "Collapse"),
    ]))),
    ("Servers/1/port", DbEntry::Type(OptionType::Integer)),
    ("Servers/1/auth_type", DbEntry::Values(ValueList::Plain(&[
        Str("config"),
        Str("http"),
        Str("signon"),
        Str("cookie"),
    ]))),
    ("Servers/1/AllowDeny/order", DbEntry::Values(ValueList::Plain(&[
        Str(""),
        Str("deny,allow"),
        Str("allow,deny"),
        Str("explicit"),
    ]))),
    ("Servers/1/AllowDeny/rules", DbEntry::Type(OptionType::Array)),
    ("Import/format", DbEntry::Values(ValueList::Plain(&[Str("csv"), Str("ldi"), Str("sql")]))),
    ("Import/csv_terminated", DbEntry::Type(OptionType::ShortString)),
    ("Import/csv_enclosed", DbEntry::Type(OptionType::ShortString)),
    ("Import/csv_escaped", DbEntry::Type(OptionType::ShortString)),
    ("Import/csv_new_line", DbEntry::Type(OptionType::ShortString)),
    ("Import/ldi_terminated", DbEntry::Type(OptionType::ShortString)),
    ("Import/ldi_enclosed", DbEntry::Type(OptionType::ShortString)),
    ("Import/ldi_escaped", DbEntry::Type(OptionType::ShortString)),
    ("Import/ldi_new_line", DbEntry::Type(OptionType::ShortString)),
    ("Import/ldi_local_option", DbEntry::Values(ValueList::Labeled(&[
        (Str("auto"), "auto"),
        (Bool(false), "no"),
        (Bool(true), "yes"),
    ]))),
    ("Export/format", DbEntry::Values(ValueList::Plain(&[
        Str("codegen"),
        Str("csv"),
        Str("excel"),
        Str("htmlexcel"),
        Str("htmlword"),
        Str("latex"),
        Str("ods"),
        Str("odt"),
        Str("pdf"),
        Str("sql"),
        Str("texytext"),
        Str("xml"),
        Str("yaml"),
    ]))),
    ("Export/compression", DbEntry::Values(ValueList::Plain(&[Str("none"), Str("zip"), Str("gzip")]))),
];

/// Written even when equal to their defaults.
pub(crate) static PERSIST: &[&str] = &[
    "DefaultLang",
    "ServerDefault",
    "Servers/1/verbose",
    "Servers/1/host",
    "Servers/1/port",
    "Servers/1/socket",
    "Servers/1/auth_type",
    "Servers/1/user",
    "Servers/1/password",
];

const POSITIVE: &[ValidatorSpec] = &[ValidatorSpec::PositiveNumber];
const NON_NEGATIVE: &[ValidatorSpec] = &[ValidatorSpec::NonNegativeNumber];
const SINGLE_CHAR: &[ValidatorSpec] = &[ValidatorSpec::ByRegex("^.$")];
const OPTIONAL_CHAR: &[ValidatorSpec] = &[ValidatorSpec::ByRegex("^.?$")];

pub(crate) static VALIDATORS: &[(&str, &[ValidatorSpec])] = &[
    ("Server", &[ValidatorSpec::Server]),
    ("Server_pmadb", &[ValidatorSpec::PmaStorage]),
    ("Servers/1/port", &[ValidatorSpec::PortNumber]),
    ("Servers/1/hide_db", &[ValidatorSpec::Regex]),
    ("TrustedProxies", &[ValidatorSpec::TrustedProxies]),
    ("ServerDefault", NON_NEGATIVE),
    ("LoginCookieValidity", POSITIVE),
    ("LoginCookieStore", NON_NEGATIVE),
    ("ExecTimeLimit", NON_NEGATIVE),
    ("MemoryLimit", &[ValidatorSpec::ByRegex(r"(?i)^(-1|(\d+(?:[kmg])?))$")]),
    ("NumRecentTables", NON_NEGATIVE),
    ("CharTextareaCols", POSITIVE),
    ("CharTextareaRows", POSITIVE),
    ("TextareaCols", POSITIVE),
    ("TextareaRows", POSITIVE),
    ("LimitChars", POSITIVE),
    ("QueryHistoryMax", POSITIVE),
    ("MaxCharactersInDisplayedSQL", POSITIVE),
    ("FirstLevelNavigationItems", POSITIVE),
    ("NavigationTreeDisplayDbFilterMinimum", POSITIVE),
    ("MaxDbList", POSITIVE),
    ("MaxTableList", POSITIVE),
    ("RepeatCells", NON_NEGATIVE),
    ("Console/Height", NON_NEGATIVE),
    ("Import/skip_queries", NON_NEGATIVE),
    ("Import/csv_terminated", SINGLE_CHAR),
    ("Import/csv_enclosed", OPTIONAL_CHAR),
    ("Import/csv_escaped", SINGLE_CHAR),
    ("Import/ldi_terminated", SINGLE_CHAR),
    ("Import/ldi_enclosed", OPTIONAL_CHAR),
    ("Import/ldi_escaped", SINGLE_CHAR),
];

/// Bounds enforced in user preferences by the base configuration.
pub(crate) static USER_VALIDATORS: &[(&str, &[ValidatorSpec])] = &[
    ("MaxDbList", &[ValidatorSpec::UpperBound("MaxDbList")]),
    ("MaxTableList", &[ValidatorSpec::UpperBound("MaxTableList")]),
    ("QueryHistoryMax", &[ValidatorSpec::UpperBound("QueryHistoryMax")]),
];

pub(crate) static GROUPS: &[FormGroup] = &[
    FormGroup {
        name: "Servers",
        setup_only: true,
        forms: &[
            FormSpec {
                name: "Server",
                setup_only: true,
                fields: &[Nested("Servers/1", &[
                    Opt("verbose"),
                    Opt("host"),
                    Opt("port"),
                    Opt("socket"),
                    Opt("ssl"),
                    Opt("compress"),
                ])],
            },
            FormSpec {
                name: "Server_auth",
                setup_only: true,
                fields: &[Nested("Servers/1", &[
                    Opt("auth_type"),
                    Group("Config authentication"),
                    Opt("user"),
                    Opt("password"),
                    GroupEnd,
                    Group("Signon authentication"),
                    Opt("SignonSession"),
                    Opt("SignonURL"),
                    Opt("LogoutURL"),
                    GroupEnd,
                ])],
            },
            FormSpec {
                name: "Server_config",
                setup_only: true,
                fields: &[Nested("Servers/1", &[
                    Opt("hide_db"),
                    Opt("AllowRoot"),
                    Opt("AllowNoPassword"),
                    Nested("AllowDeny", &[Opt("order"), Opt("rules")]),
                ])],
            },
            FormSpec {
                name: "Server_pmadb",
                setup_only: true,
                fields: &[Nested("Servers/1", &[
                    Preset("pmadb", Str("phpmyadmin")),
                    Opt("controlhost"),
                    Opt("controluser"),
                    Opt("controlpass"),
                    Preset("bookmarktable", Str("pma__bookmark")),
                    Preset("relation", Str("pma__relation")),
                    Preset("table_info", Str("pma__table_info")),
                    Preset("history", Str("pma__history")),
                    Preset("recent", Str("pma__recent")),
                    Preset("favorite", Str("pma__favorite")),
                    Preset("userconfig", Str("pma__userconfig")),
                ])],
            },
        ],
    },
    FormGroup {
        name: "Features",
        setup_only: false,
        forms: &[
            FormSpec {
                name: "General",
                setup_only: false,
                fields: &[Opt("NumRecentTables"), Opt("ShowHint"), Opt("UserprefsDeveloperTab")],
            },
            FormSpec {
                name: "Text_fields",
                setup_only: false,
                fields: &[
                    Opt("CharTextareaCols"),
                    Opt("CharTextareaRows"),
                    Opt("TextareaCols"),
                    Opt("TextareaRows"),
                ],
            },
            FormSpec {
                name: "Console",
                setup_only: false,
                fields: &[Nested("Console", &[
                    Opt("Mode"),
                    Opt("Height"),
                    Opt("StartHistory"),
                    Opt("AlwaysExpand"),
                ])],
            },
            FormSpec {
                name: "Security",
                setup_only: true,
                fields: &[
                    Opt("AllowArbitraryServer"),
                    Opt("LoginCookieValidity"),
                    Opt("LoginCookieStore"),
                    Opt("TrustedProxies"),
                    Opt("CheckConfigurationPermissions"),
                ],
            },
            FormSpec {
                name: "Other_core",
                setup_only: true,
                fields: &[
                    Opt("DefaultLang"),
                    Opt("ServerDefault"),
                    Opt("VersionCheck"),
                    Group("Resources"),
                    Opt("MemoryLimit"),
                    Opt("ExecTimeLimit"),
                    GroupEnd,
                    Group("Character sets"),
                    Opt("RecodingEngine"),
                    Opt("IconvExtraParams"),
                    GroupEnd,
                    Group("Compression"),
                    Opt("ZipDump"),
                    Opt("GZipDump"),
                    Opt("BZipDump"),
                    Opt("CompressOnFly"),
                    GroupEnd,
                ],
            },
        ],
    },
    FormGroup {
        name: "Sql_queries",
        setup_only: false,
        forms: &[
            FormSpec {
                name: "Sql_queries",
                setup_only: false,
                fields: &[
                    Opt("ShowSQL"),
                    Opt("Confirm"),
                    Opt("QueryHistoryDB"),
                    Opt("QueryHistoryMax"),
                    Opt("IgnoreMultiSubmitErrors"),
                    Opt("MaxCharactersInDisplayedSQL"),
                ],
            },
            FormSpec {
                name: "Sql_box",
                setup_only: false,
                fields: &[Nested("SQLQuery", &[
                    Opt("Edit"),
                    Opt("Explain"),
                    Opt("ShowAsPHP"),
                    Opt("Refresh"),
                ])],
            },
        ],
    },
    FormGroup {
        name: "Navi_panel",
        setup_only: false,
        forms: &[
            FormSpec {
                name: "Navi_panel",
                setup_only: false,
                fields: &[
                    Opt("NavigationDisplayLogo"),
                    Opt("FirstLevelNavigationItems"),
                    Opt("NavigationTreeDbSeparator"),
                    Opt("NavigationTreeEnableGrouping"),
                ],
            },
            FormSpec {
                name: "Navi_databases",
                setup_only: false,
                fields: &[
                    Opt("ShowDatabasesNavigationAsTree"),
                    Opt("NavigationTreeDisplayDbFilterMinimum"),
                    Opt("MaxDbList"),
                    Opt("MaxTableList"),
                ],
            },
        ],
    },
    FormGroup {
        name: "Main_panel",
        setup_only: false,
        forms: &[
            FormSpec {
                name: "Startup",
                setup_only: false,
                fields: &[Opt("ShowStats"), Opt("ShowServerInfo")],
            },
            FormSpec {
                name: "Browse",
                setup_only: false,
                fields: &[Opt("MaxRows"), Opt("Order"), Opt("RepeatCells")],
            },
            FormSpec {
                name: "Edit",
                setup_only: false,
                fields: &[Opt("ProtectBinary"), Opt("LimitChars")],
            },
            FormSpec {
                name: "Tabs",
                setup_only: false,
                fields: &[
                    Opt("TabsMode"),
                    Opt("DefaultTabServer"),
                    Opt("DefaultTabDatabase"),
                    Opt("DefaultTabTable"),
                ],
            },
        ],
    },
    FormGroup {
        name: "Import",
        setup_only: false,
        forms: &[
            FormSpec {
                name: "Import_defaults",
                setup_only: false,
                fields: &[Nested("Import", &[
                    Opt("format"),
                    Opt("allow_interrupt"),
                    Opt("skip_queries"),
                ])],
            },
            FormSpec {
                name: "Csv",
                setup_only: false,
                fields: &[Nested("Import", &[
                    Opt("csv_replace"),
                    Opt("csv_ignore"),
                    Opt("csv_terminated"),
                    Opt("csv_enclosed"),
                    Opt("csv_escaped"),
                    Opt("csv_new_line"),
                    Opt("csv_columns"),
                    Opt("csv_col_names"),
                ])],
            },
            FormSpec {
                name: "Ldi",
                setup_only: false,
                fields: &[Nested("Import", &[
                    Opt("ldi_replace"),
                    Opt("ldi_ignore"),
                    Opt("ldi_terminated"),
                    Opt("ldi_enclosed"),
                    Opt("ldi_escaped"),
                    Opt("ldi_new_line"),
                    Opt("ldi_columns"),
                    Opt("ldi_local_option"),
                ])],
            },
        ],
    },
    FormGroup {
        name: "Export",
        setup_only: false,
        forms: &[FormSpec {
            name: "Export_defaults",
            setup_only: false,
            fields: &[Nested("Export", &[
                Opt("format"),
                Opt("compression"),
                Opt("asfile"),
                Opt("charset"),
                Opt("onserver"),
                Opt("file_template_table"),
                Opt("remember_file_template"),
            ])],
        }],
    },
];
