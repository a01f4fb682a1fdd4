pub struct YahooApiConfig {
    pub timeout_ms: u64,
    pub user_agent: &'static str,
}

impl Default for YahooApiConfig {
    fn default() -> Self {
        Self {
            timeout_ms: YAHOO.client.timeout_ms,
            user_agent: YAHOO.client.user_agent,
        }
    }
}

/// Request budget shared by all outgoing calls of one provider instance.
pub struct RestLimits {
    pub requests_per_minute: u32,
    /// The chart call returns bars, the quote call only fundamentals
    pub chart_call_weight: u32,
    pub quote_call_weight: u32,
    /// Cookie priming plus crumb fetch, paid once per session
    pub session_call_weight: u32,
}

pub struct Endpoints {
    pub chart_base_url: &'static str,
    pub quote_base_url: &'static str,
    /// Any hit here sets the session cookie that crumbs are bound to
    pub cookie_url: &'static str,
    pub crumb_url: &'static str,
    /// Bar width requested from the chart API
    pub interval: &'static str,
}

pub struct ClientDefaults {
    pub timeout_ms: u64,
    pub user_agent: &'static str,
}

pub struct YahooConfig {
    pub limits: RestLimits,
    pub endpoints: Endpoints,
    pub client: ClientDefaults,
}

pub const YAHOO: YahooConfig = YahooConfig {
    limits: RestLimits {
        requests_per_minute: 60,
        chart_call_weight: 1,
        quote_call_weight: 1,
        session_call_weight: 2,
    },
    endpoints: Endpoints {
        chart_base_url: "https://query1.finance.yahoo.com/v8/finance/chart",
        quote_base_url: "https://query1.finance.yahoo.com/v7/finance/quote",
        cookie_url: "https://fc.yahoo.com",
        crumb_url: "https://query1.finance.yahoo.com/v1/test/getcrumb",
        interval: "1d",
    },
    client: ClientDefaults {
        timeout_ms: 10_000,
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) stock-forecast/0.1",
    },
};
