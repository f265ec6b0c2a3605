use log::trace;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// 실시간 캡처용 분석 진입 게이트
///
/// 동시에 하나의 분석만 진행되도록 하며, 분석 중에 들어온 프레임은 버리고 개수만 셉니다.
/// 잠금 없이 원자 연산만 사용하므로 여러 스레드에서 공유할 수 있습니다.
#[derive(Debug, Default)]
pub struct AnalysisGate {
    busy: AtomicBool,
    dropped: AtomicU64,
}

/// 진행 중인 분석 하나를 나타내는 가드
///
/// 가드가 drop되면 게이트가 다시 열립니다.
#[derive(Debug)]
pub struct AnalysisGuard<'a> {
    gate: &'a AnalysisGate,
}

impl AnalysisGate {
    pub fn new() -> AnalysisGate {
        AnalysisGate::default()
    }

    /// 분석 시작 시도
    ///
    /// # Returns
    /// * `Option<AnalysisGuard>` - 시작할 수 있으면 가드, 이미 분석 중이면 None (프레임 버림)
    pub fn try_begin(&self) -> Option<AnalysisGuard<'_>> {
        match self
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
        {
            Ok(_) => Some(AnalysisGuard { gate: self }),
            Err(_) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                trace!("분석 진행 중, 프레임 버림 (누적 {})", dropped);
                None
            }
        }
    }

    /// 분석이 진행 중인지
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// 지금까지 버려진 프레임 수
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for AnalysisGuard<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}
