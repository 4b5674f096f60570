//! Identity phase locking (Laroche & Dolson 1999).
//!
//! A sinusoid smeared across several bins only resynthesises as one partial
//! if those bins keep their analysis phase relationship. Peak bins advance
//! freely; every other bin follows its nearest peak.

/// Collects local magnitude maxima (strictly above both neighbours) into
/// `peaks`. The vector is cleared first and never grows past its capacity
/// for a spectrum of the size it was allocated for.
pub fn find_peaks(magnitudes: &[f32], peaks: &mut Vec<usize>) {
    peaks.clear();
    let num_bins = magnitudes.len();
    if num_bins < 3 {
        return;
    }
    for bin in 1..num_bins - 1 {
        if magnitudes[bin] > magnitudes[bin - 1] && magnitudes[bin] > magnitudes[bin + 1] {
            peaks.push(bin);
        }
    }
}

/// Rewrites every non-peak synthesis phase as its nearest peak's synthesis
/// phase plus the analysis phase offset between the two bins.
///
/// `peaks` must be sorted ascending, as produced by [`find_peaks`].
pub fn lock_to_peaks(peaks: &[usize], analysis_phases: &[f32], synthesis_phases: &mut [f32]) {
    if peaks.is_empty() {
        return;
    }

    let mut peak_idx = 0;
    for bin in 0..synthesis_phases.len() {
        while peak_idx + 1 < peaks.len()
            && peaks[peak_idx + 1].abs_diff(bin) < peaks[peak_idx].abs_diff(bin)
        {
            peak_idx += 1;
        }

        let nearest = peaks[peak_idx];
        if bin != nearest {
            let analysis_diff = analysis_phases[bin] - analysis_phases[nearest];
            synthesis_phases[bin] = synthesis_phases[nearest] + analysis_diff;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_peaks_skips_edges_and_plateaus() {
        let mags = [5.0, 1.0, 3.0, 1.0, 2.0, 2.0, 1.0, 4.0, 0.5, 6.0];
        let mut peaks = Vec::with_capacity(mags.len());
        find_peaks(&mags, &mut peaks);
        assert_eq!(peaks, vec![2, 7]);

        find_peaks(&[1.0, 2.0], &mut peaks);
        assert!(peaks.is_empty());
    }

    #[test]
    fn test_lock_keeps_analysis_offsets_around_peak() {
        let analysis = [0.1f32, 0.4, 1.0, 1.3, 2.0];
        let mut synthesis = [9.0f32, 9.0, 5.0, 9.0, 9.0];
        lock_to_peaks(&[2], &analysis, &mut synthesis);

        assert_eq!(synthesis[2], 5.0);
        for bin in 0..5 {
            let expected = 5.0 + analysis[bin] - analysis[2];
            assert!((synthesis[bin] - expected).abs() < 1e-6, "bin {}", bin);
        }
    }

    #[test]
    fn test_lock_assigns_nearest_peak() {
        let analysis = [0.0f32; 10];
        let mut synthesis = [0.0f32; 10];
        synthesis[2] = 1.0;
        synthesis[7] = 2.0;
        lock_to_peaks(&[2, 7], &analysis, &mut synthesis);

        assert_eq!(&synthesis[..5], &[1.0; 5]);
        assert_eq!(&synthesis[5..], &[2.0; 5]);
    }

    #[test]
    fn test_no_peaks_leaves_phases() {
        let mut synthesis = [0.3f32, 0.7];
        lock_to_peaks(&[], &[0.0, 0.0], &mut synthesis);
        assert_eq!(synthesis, [0.3, 0.7]);
    }
}
