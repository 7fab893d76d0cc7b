use crate::error::AppError;
use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::collections::{HashMap, VecDeque};
use std::future::{Ready, ready};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// 滑动窗口限流器，按客户端地址计数
#[derive(Clone)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    trust_proxy: bool,
    hits: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            trust_proxy: false,
            hits: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 部署在可信反向代理之后时，按 Forwarded / X-Forwarded-For 识别客户端
    pub fn trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    pub fn per_minute(max_requests: usize) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// 记录一次请求，超出窗口配额时返回 false
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut hits = match self.hits.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // 清理窗口外的记录，空的地址整条删除
        let window = self.window;
        hits.retain(|_, stamps| {
            while let Some(&front) = stamps.front() {
                if now.duration_since(front) >= window {
                    stamps.pop_front();
                } else {
                    break;
                }
            }
            !stamps.is_empty()
        });

        let entry = hits.entry(key.to_string()).or_default();
        if entry.len() >= self.max_requests {
            return false;
        }
        entry.push_back(now);
        true
    }

    /// 默认使用套接字对端地址，客户端自带的转发头不可信
    fn client_key(&self, req: &ServiceRequest) -> String {
        if self.trust_proxy
            && let Some(ip) = req.connection_info().realip_remote_addr()
        {
            return ip.to_string();
        }
        req.peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

pub struct RateLimit {
    limiter: RateLimiter,
}

impl RateLimit {
    pub fn new(limiter: RateLimiter) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService {
            service,
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitService<S> {
    service: S,
    limiter: RateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let key = self.limiter.client_key(&req);

        if !self.limiter.check(&key) {
            log::warn!("Rate limit exceeded for {key} on {}", req.path());
            return Box::pin(async move { Err(AppError::RateLimited.into()) });
        }

        Box::pin(self.service.call(req))
    }
}
