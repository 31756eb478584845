use super::config::SeoConfig;
use super::escape_attr;

/// Build the tracking snippets enabled in the configuration.
/// Each entry is a complete `<script>` block wrapped in marker comments.
pub fn build_analytics_scripts(config: &SeoConfig) -> Vec<String> {
    let mut scripts = Vec::new();

    // Google Analytics (analytics.js)
    if !config.google_analytics.is_empty() {
        let anonymize = if config.google_analytics_anonymize_ip {
            "ga('set', 'anonymizeIp', true);\n"
        } else {
            ""
        };
        scripts.push(format!(
            r#"<!-- Google Analytics -->
<script>
(function(i,s,o,g,r,a,m){{i['GoogleAnalyticsObject']=r;i[r]=i[r]||function(){{
(i[r].q=i[r].q||[]).push(arguments)}},i[r].l=1*new Date();a=s.createElement(o),
m=s.getElementsByTagName(o)[0];a.async=1;a.src=g;m.parentNode.insertBefore(a,m)
}})(window,document,'script','//www.google-analytics.com/analytics.js','ga');
ga('create', '{id}', 'auto');
{anonymize}ga('send', 'pageview');
</script>
<!-- End: Google Analytics -->"#,
            id = escape_attr(&config.google_analytics),
            anonymize = anonymize,
        ));
    }

    // Piwik
    if !config.piwik_url.is_empty() {
        let host = config
            .piwik_url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        scripts.push(format!(
            r#"<!-- Piwik -->
<script type="text/javascript">
var _paq = _paq || [];
(function(){{ var u=(("https:" == document.location.protocol) ? "https://{host}/" : "http://{host}/");
_paq.push(['setSiteId', '{site_id}']);
_paq.push(['setTrackerUrl', u+'piwik.php']);
_paq.push(['trackPageView']);
_paq.push(['enableLinkTracking']);
var d=document, g=d.createElement('script'), s=d.getElementsByTagName('script')[0]; g.type='text/javascript'; g.defer=true; g.async=true; g.src=u+'piwik.js';
s.parentNode.insertBefore(g,s); }})();
</script>
<!-- End Piwik Code -->"#,
            host = escape_attr(host),
            site_id = escape_attr(&config.piwik_site_id),
        ));
    }

    scripts
}
