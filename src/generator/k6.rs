use crate::generator::types::ScriptParameters;
use crate::parser::ParsedRequest;

const REPORTER_BUNDLE: &str =
    "https://raw.githubusercontent.com/benc-uk/k6-reporter/main/dist/bundle.js";

const SUMMARY_TREND_STATS: &str = "['min', 'med', 'avg', 'p(90)', 'p(95)', 'p(99)', 'max', 'count']";

pub struct ScriptComposer;

impl ScriptComposer {
    /// 为请求生成完整的 k6 脚本
    ///
    /// 参数原样嵌入，只转义 Header 值和请求体中的单引号
    pub fn compose(request: &ParsedRequest, params: &ScriptParameters) -> String {
        let mut script = String::new();

        Self::write_preamble(&mut script);
        Self::write_thresholds(&mut script, params);
        Self::write_options(&mut script, params);
        Self::write_default_function(&mut script, request);
        Self::write_handle_summary(&mut script, &params.test_name);

        script
    }

    fn write_preamble(script: &mut String) {
        script.push_str("import http from 'k6/http';\n");
        script.push_str("import { check, sleep } from 'k6';\n");
        script.push_str("import { Trend, Rate, Counter } from 'k6/metrics';\n");
        script.push_str(&format!(
            "import {{ htmlReport }} from '{}';\n\n",
            REPORTER_BUNDLE
        ));

        script.push_str("// Custom metrics for detailed analysis\n");
        script.push_str("const responseTimes = new Trend('response_times');\n");
        script.push_str("const requestRate = new Rate('request_rate');\n");
        script.push_str("const successRate = new Rate('success_rate');\n");
        script.push_str("const errorCounter = new Counter('error_counter');\n\n");
    }

    fn write_thresholds(script: &mut String, params: &ScriptParameters) {
        script.push_str("// Thresholds for pass/fail criteria\n");
        script.push_str("export let thresholds = {\n");
        if params.thresholds.is_empty() {
            script.push_str("  'http_req_duration': ['p(95)<30000'],\n");
            script.push_str("  'success_rate': ['rate>0.95'],\n");
        } else {
            for (metric, expression) in params.threshold_rules() {
                script.push_str(&format!("  '{}': ['{}'],\n", metric, expression));
            }
        }
        script.push_str("};\n\n");
    }

    fn write_options(script: &mut String, params: &ScriptParameters) {
        script.push_str("export let options = {\n");
        script.push_str(&format!("  vus: {},\n", params.virtual_users));
        script.push_str(&format!("  duration: '{}',\n", params.duration));
        script.push_str("  thresholds,\n");
        script.push_str(&format!("  summaryTrendStats: {},\n", SUMMARY_TREND_STATS));
        script.push_str("};\n\n");
    }

    fn write_default_function(script: &mut String, request: &ParsedRequest) {
        script.push_str("export default function () {\n");
        script.push_str(&format!("  let url = '{}';\n", request.url));
        script.push_str("  let params = {\n");

        if !request.headers.is_empty() {
            script.push_str("    headers: {\n");
            for (name, value) in request.header_pairs() {
                script.push_str(&format!("      '{}': '{}',\n", name, escape_quotes(value)));
            }
            script.push_str("    },\n");
        }

        if let Some(body) = request.non_empty_body() {
            script.push_str(&format!("    body: '{}',\n", escape_quotes(body)));
        }

        script.push_str("  };\n\n");
        script.push_str(&format!(
            "  let response = http.{}(url, params);\n\n",
            request.method.to_lowercase()
        ));

        script.push_str("  // Track request count\n");
        script.push_str("  requestRate.add(1);\n\n");

        script.push_str("  // Track response times\n");
        script.push_str("  const duration = response.timings.duration;\n");
        script.push_str("  responseTimes.add(duration);\n\n");

        script.push_str("  // Check if request was successful\n");
        script.push_str("  const isSuccess = response.status >= 200 && response.status < 300;\n");
        script.push_str("  successRate.add(isSuccess);\n\n");

        script.push_str("  if (!isSuccess) {\n");
        script.push_str("    errorCounter.add(1);\n");
        script.push_str(
            "    console.log(`Error: ${response.status} - ${response.body.substring(0, 100)}...`);\n",
        );
        script.push_str("  }\n\n");

        // 固定的检查项，与上面的阈值无关
        script.push_str("  // Run checks\n");
        script.push_str("  check(response, {\n");
        script.push_str("    'is status 200': (r) => r.status === 200,\n");
        script.push_str("    'response time < 500ms': (r) => r.timings.duration < 500,\n");
        script.push_str("    'response time < 1000ms': (r) => r.timings.duration < 1000,\n");
        script.push_str("  });\n\n");

        script.push_str("  sleep(1);\n");
        script.push_str("}\n\n");
    }

    fn write_handle_summary(script: &mut String, test_name: &str) {
        script.push_str("export function handleSummary(data) {\n");
        script.push_str("  console.log('Generating HTML report...');\n");
        script.push_str("  if (!data) {\n");
        script.push_str("    console.error('No data received for summary.');\n");
        script.push_str("    return {};\n");
        script.push_str("  }\n");
        script.push_str("  return {\n");
        script.push_str(&format!(
            "    './{}_report.html': htmlReport(data),\n",
            test_name
        ));
        script.push_str("  };\n");
        script.push_str("}\n");
    }
}

/// 转义单引号，用于 JS 单引号字符串
fn escape_quotes(value: &str) -> String {
    value.replace('\'', "\\'")
}
