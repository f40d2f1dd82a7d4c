/// Average interleaved channels down to one
pub fn to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks_exact(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Streaming linear-interpolation resampler for mono audio.
///
/// Output sample `k` sits at input position `k * from / to`, tracked with integer
/// counters across calls, so feeding a signal in arbitrary chunks yields exactly
/// the same output as feeding it whole.
#[derive(Debug, Clone)]
pub struct LinearResampler {
    from_rate: u32,
    to_rate: u32,
    /// Input samples seen before the current chunk
    consumed: u64,
    /// Output samples emitted so far
    produced: u64,
    /// Last input sample of the previous chunk
    prev: Option<i16>,
}

impl LinearResampler {
    pub fn new(from_rate: u32, to_rate: u32) -> Self {
        Self {
            from_rate,
            to_rate,
            consumed: 0,
            produced: 0,
            prev: None,
        }
    }

    pub fn from_rate(&self) -> u32 {
        self.from_rate
    }

    pub fn to_rate(&self) -> u32 {
        self.to_rate
    }

    /// Resample the next chunk of input
    pub fn process(&mut self, input: &[i16]) -> Vec<i16> {
        if self.from_rate == self.to_rate || self.from_rate == 0 || self.to_rate == 0 {
            return input.to_vec();
        }
        if input.is_empty() {
            return Vec::new();
        }

        let from = self.from_rate as u64;
        let to = self.to_rate as u64;

        // Global input index of window[0]
        let base = match self.prev {
            Some(_) => self.consumed - 1,
            None => self.consumed,
        };
        let window: Vec<i16> = self.prev.into_iter().chain(input.iter().copied()).collect();
        let end = base + window.len() as u64;

        let capacity = input.len() * self.to_rate as usize / self.from_rate as usize + 1;
        let mut out = Vec::with_capacity(capacity);
        loop {
            let scaled = self.produced * from;
            let idx = scaled / to;
            // Interpolation needs the sample after idx
            if idx + 1 >= end {
                break;
            }

            let frac = (scaled % to) as f64 / to as f64;
            let s0 = window[(idx - base) as usize] as f64;
            let s1 = window[(idx + 1 - base) as usize] as f64;
            out.push((s0 + (s1 - s0) * frac).round() as i16);
            self.produced += 1;
        }

        self.consumed += input.len() as u64;
        self.prev = window.last().copied();
        out
    }
}

/// f32 sample in [-1, 1] to i16
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}
